// src/db/followup_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::followups::{Followup, FollowupSource, FollowupStatus},
};

#[derive(Clone)]
pub struct FollowupRepository {
    pool: PgPool,
}

impl FollowupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insere um follow-up. Recebe executor para entrar na mesma transação
    /// do carimbo de supressão quando a origem é automática.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        deal_id: Uuid,
        business_name: &str,
        assigned_to: Uuid,
        assigned_to_name: &str,
        reminder_date: NaiveDate,
        next_action: Option<&str>,
        notes: Option<&str>,
        source: FollowupSource,
    ) -> Result<Followup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let followup = sqlx::query_as::<_, Followup>(
            r#"
            INSERT INTO followups (
                deal_id, business_name, assigned_to, assigned_to_name,
                reminder_date, next_action, notes, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(deal_id)
        .bind(business_name)
        .bind(assigned_to)
        .bind(assigned_to_name)
        .bind(reminder_date)
        .bind(next_action)
        .bind(notes)
        .bind(source)
        .fetch_one(executor)
        .await?;

        Ok(followup)
    }

    /// Ordenado por data de lembrete direto no SQL, coberto pelo índice
    /// composto (assigned_to, reminder_date).
    pub async fn list_for_user(&self, assigned_to: Uuid) -> Result<Vec<Followup>, AppError> {
        let followups = sqlx::query_as::<_, Followup>(
            r#"
            SELECT * FROM followups
            WHERE assigned_to = $1
            ORDER BY reminder_date ASC, created_at ASC
            "#,
        )
        .bind(assigned_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(followups)
    }

    pub async fn list_for_deal(&self, deal_id: Uuid) -> Result<Vec<Followup>, AppError> {
        let followups = sqlx::query_as::<_, Followup>(
            r#"
            SELECT * FROM followups
            WHERE deal_id = $1
            ORDER BY reminder_date ASC, created_at ASC
            "#,
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followups)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Followup>, AppError> {
        let followup = sqlx::query_as::<_, Followup>("SELECT * FROM followups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(followup)
    }

    /// Edição manual: é o único caminho que regrava o status armazenado
    /// (inclusive 'overdue', se o usuário quiser persistir o rótulo).
    pub async fn update(
        &self,
        id: Uuid,
        reminder_date: Option<NaiveDate>,
        next_action: Option<&str>,
        notes: Option<&str>,
        status: Option<FollowupStatus>,
    ) -> Result<Followup, AppError> {
        let followup = sqlx::query_as::<_, Followup>(
            r#"
            UPDATE followups SET
                reminder_date = COALESCE($2, reminder_date),
                next_action   = COALESCE($3, next_action),
                notes         = COALESCE($4, notes),
                status        = COALESCE($5, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reminder_date)
        .bind(next_action)
        .bind(notes)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Follow-up"))?;

        Ok(followup)
    }

    pub async fn complete(&self, id: Uuid) -> Result<Followup, AppError> {
        let followup = sqlx::query_as::<_, Followup>(
            r#"
            UPDATE followups SET
                status = 'done',
                completed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Follow-up"))?;

        Ok(followup)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM followups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
