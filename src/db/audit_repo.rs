// src/db/audit_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::audit::AuditLog};

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava a entrada na MESMA transação da mutação auditada:
    /// ou as duas entram, ou nenhuma.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        entity_kind: &str,
        entity_id: Uuid,
        action: &str,
        actor_id: Uuid,
        actor_name: &str,
        detail: &Value,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (entity_kind, entity_id, action, actor_id, actor_name, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entity_kind)
        .bind(entity_id)
        .bind(action)
        .bind(actor_id)
        .bind(actor_name)
        .bind(detail)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_for_entity(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> Result<Vec<AuditLog>, AppError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE entity_kind = $1 AND entity_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(entity_kind)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
