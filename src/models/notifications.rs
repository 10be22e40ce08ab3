// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FollowupCreated,
    FollowupOverdue,
    DealStatusChanged,
    QuoteAccepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Lembrete automático criado para Padaria Estrela do Sul")]
    pub message: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,

    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,

    #[schema(example = "/deals/550e8400-e29b-41d4-a716-446655440000")]
    pub action_url: Option<String>,

    #[schema(value_type = Object)]
    pub metadata: Value,

    pub created_at: DateTime<Utc>,
}
