// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Entrada da trilha de auditoria. Gravada junto (mesma transação)
/// com a mutação que descreve.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,

    #[schema(example = "deal")]
    pub entity_kind: String,
    pub entity_id: Uuid,

    #[schema(example = "status_changed")]
    pub action: String,

    pub actor_id: Uuid,
    pub actor_name: String,

    #[schema(value_type = Object)]
    pub detail: Value,

    pub created_at: DateTime<Utc>,
}
