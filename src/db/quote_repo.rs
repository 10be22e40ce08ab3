// src/db/quote_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::quotes::{Quote, QuoteItem, QuoteStatus, QuoteTotals},
};

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Próximo número do mês, via UPSERT atômico no contador.
    /// Dois orçamentos criados ao mesmo tempo nunca repetem número.
    pub async fn next_quote_number<'e, E>(
        &self,
        executor: E,
        year_month: &str,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let value = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO quote_counters (year_month, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year_month)
            DO UPDATE SET last_value = quote_counters.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year_month)
        .fetch_one(executor)
        .await?;

        Ok(value)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        deal_id: Option<Uuid>,
        client_name: &str,
        client_email: Option<&str>,
        client_phone: Option<&str>,
        quote_number: &str,
        title: &str,
        items: &[QuoteItem],
        discount: Decimal,
        tax: Decimal,
        totals: QuoteTotals,
        terms: Option<&str>,
        valid_until: Option<NaiveDate>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                deal_id, client_name, client_email, client_phone, quote_number,
                title, items, subtotal, discount, discount_amount, tax,
                tax_amount, total, terms, valid_until, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(deal_id)
        .bind(client_name)
        .bind(client_email)
        .bind(client_phone)
        .bind(quote_number)
        .bind(title)
        .bind(Json(items))
        .bind(totals.subtotal)
        .bind(discount)
        .bind(totals.discount_amount)
        .bind(tax)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(terms)
        .bind(valid_until)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(quote)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quote)
    }

    pub async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    /// Reescreve conteúdo e totais. Os totais chegam sempre recalculados
    /// pelo serviço; nunca são aceitos do payload.
    pub async fn update_content(
        &self,
        id: Uuid,
        client_name: &str,
        client_email: Option<&str>,
        client_phone: Option<&str>,
        title: &str,
        items: &[QuoteItem],
        discount: Decimal,
        tax: Decimal,
        totals: QuoteTotals,
        terms: Option<&str>,
        valid_until: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<Quote, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes SET
                client_name = $2,
                client_email = $3,
                client_phone = $4,
                title = $5,
                items = $6,
                subtotal = $7,
                discount = $8,
                discount_amount = $9,
                tax = $10,
                tax_amount = $11,
                total = $12,
                terms = $13,
                valid_until = $14,
                notes = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(client_name)
        .bind(client_email)
        .bind(client_phone)
        .bind(title)
        .bind(Json(items))
        .bind(totals.subtotal)
        .bind(discount)
        .bind(totals.discount_amount)
        .bind(tax)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(terms)
        .bind(valid_until)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;

        Ok(quote)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: QuoteStatus,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            "UPDATE quotes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Orçamento"))?;

        Ok(quote)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
