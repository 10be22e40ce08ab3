// src/db/deal_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::deals::{Deal, DealStatus},
};

#[derive(Clone)]
pub struct DealRepository {
    pool: PgPool,
}

impl DealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO (participa da transação da trava de contato)
    // =========================================================================

    /// Insere um negócio. Quando `source_contact_id` vem preenchido, o índice
    /// único parcial `deals_active_source_contact_key` é quem decide a corrida:
    /// o segundo INSERT concorrente falha e vira `ContactLocked`.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        business_name: &str,
        contact_person: Option<&str>,
        phone_number: Option<&str>,
        email: Option<&str>,
        status: DealStatus,
        price: Decimal,
        notes: Option<&str>,
        source_contact_id: Option<Uuid>,
        created_by: Uuid,
        created_by_name: &str,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals (
                business_name, contact_person, phone_number, email, status,
                price, notes, source_contact_id, created_by, created_by_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(business_name)
        .bind(contact_person)
        .bind(phone_number)
        .bind(email)
        .bind(status)
        .bind(price)
        .bind(notes)
        .bind(source_contact_id)
        .bind(created_by)
        .bind(created_by_name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::ContactLocked(
                        "Outro vendedor acabou de iniciar um negócio com este contato."
                            .to_string(),
                    );
                }
            }
            e.into()
        })?;

        Ok(deal)
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    /// Lista com escopo por dono: `owner = None` enxerga a carteira inteira.
    pub async fn list(
        &self,
        owner: Option<Uuid>,
        include_archived: bool,
    ) -> Result<Vec<Deal>, AppError> {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE ($1::uuid IS NULL OR created_by = $1)
              AND ($2 OR archived = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await?;

        Ok(deals)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Deal>, AppError> {
        let deal = sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(deal)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(deal)
    }

    /// O predicado da trava: negócio ativo apontando para o contato pelo id,
    /// OU pelo par (empresa sem case, telefone), o vínculo legado por nome.
    pub async fn find_active_for_contact<'e, E>(
        &self,
        executor: E,
        contact_id: Uuid,
        company_name: &str,
        phone: Option<&str>,
    ) -> Result<Option<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE archived = FALSE
              AND status NOT IN ('closed', 'lost')
              AND (
                    source_contact_id = $1
                    OR (lower(business_name) = lower($2) AND phone_number = $3)
              )
            LIMIT 1
            "#,
        )
        .bind(contact_id)
        .bind(company_name)
        .bind(phone)
        .fetch_optional(executor)
        .await?;

        Ok(deal)
    }

    /// Negócios abertos de um dono, para a varredura de SLA.
    pub async fn list_active_owned(&self, owner: Uuid) -> Result<Vec<Deal>, AppError> {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE created_by = $1
              AND archived = FALSE
              AND status NOT IN ('closed', 'lost')
            ORDER BY status_updated_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(deals)
    }

    /// Donos distintos com negócio aberto (varredura periódica de SLA).
    pub async fn distinct_active_owners(&self) -> Result<Vec<(Uuid, String)>, AppError> {
        let owners = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT DISTINCT created_by, created_by_name
            FROM deals
            WHERE archived = FALSE AND status NOT IN ('closed', 'lost')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(owners)
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    /// Update parcial. Campos None mantêm o valor atual; mudança de status
    /// re-carimba status_updated_at na mesma instrução (o CASE enxerga o
    /// valor antigo da linha).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        business_name: Option<&str>,
        contact_person: Option<&str>,
        phone_number: Option<&str>,
        email: Option<&str>,
        price: Option<Decimal>,
        notes: Option<&str>,
        status: Option<DealStatus>,
        history_entry: &Value,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals SET
                business_name  = COALESCE($2, business_name),
                contact_person = COALESCE($3, contact_person),
                phone_number   = COALESCE($4, phone_number),
                email          = COALESCE($5, email),
                price          = COALESCE($6, price),
                notes          = COALESCE($7, notes),
                status_updated_at = CASE
                    WHEN $8::deal_status IS NOT NULL
                         AND $8::deal_status IS DISTINCT FROM status
                    THEN NOW()
                    ELSE status_updated_at
                END,
                status         = COALESCE($8, status),
                edit_history   = edit_history || $9,
                updated_at     = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(business_name)
        .bind(contact_person)
        .bind(phone_number)
        .bind(email)
        .bind(price)
        .bind(notes)
        .bind(status)
        .bind(history_entry)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Negócio"))?;

        Ok(deal)
    }

    /// A "reivindicação" do lembrete automático: carimba a supressão de forma
    /// condicional. rows_affected = 0 significa que outra varredura chegou
    /// antes dentro da mesma janela de SLA.
    pub async fn claim_auto_followup<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stage: DealStatus,
        window_start: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE deals SET
                last_auto_follow_up_at = NOW(),
                last_auto_follow_up_stage = $2
            WHERE id = $1
              AND (
                    last_auto_follow_up_stage IS DISTINCT FROM $2
                    OR last_auto_follow_up_at IS NULL
                    OR last_auto_follow_up_at < $3
              )
            "#,
        )
        .bind(id)
        .bind(stage)
        .bind(window_start)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_archived(&self, id: Uuid, archived: bool) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE deals SET archived = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(archived)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
