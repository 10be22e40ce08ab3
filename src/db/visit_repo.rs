// src/db/visit_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::visits::Visit};

#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        deal_id: Uuid,
        business_name: &str,
        sales_rep_id: Uuid,
        sales_rep_name: &str,
        address: Option<&str>,
        visit_date: NaiveDate,
        purpose: Option<&str>,
        result: Option<&str>,
        next_step: Option<&str>,
    ) -> Result<Visit, AppError> {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (
                deal_id, business_name, sales_rep_id, sales_rep_name,
                address, visit_date, purpose, result, next_step
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(deal_id)
        .bind(business_name)
        .bind(sales_rep_id)
        .bind(sales_rep_name)
        .bind(address)
        .bind(visit_date)
        .bind(purpose)
        .bind(result)
        .bind(next_step)
        .fetch_one(&self.pool)
        .await?;

        Ok(visit)
    }

    pub async fn list_for_deal(&self, deal_id: Uuid) -> Result<Vec<Visit>, AppError> {
        let visits = sqlx::query_as::<_, Visit>(
            "SELECT * FROM visits WHERE deal_id = $1 ORDER BY visit_date DESC",
        )
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    pub async fn list_for_rep(&self, sales_rep_id: Uuid) -> Result<Vec<Visit>, AppError> {
        let visits = sqlx::query_as::<_, Visit>(
            "SELECT * FROM visits WHERE sales_rep_id = $1 ORDER BY visit_date DESC",
        )
        .bind(sales_rep_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
