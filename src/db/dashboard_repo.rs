// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{DashboardSummary, SalesChartEntry},
};

/// Linha crua do ranking; a comissão é derivada no serviço.
#[derive(Debug, FromRow)]
pub struct LeaderboardRow {
    pub rep_id: Uuid,
    pub rep_name: String,
    pub closed_count: i64,
    pub revenue: Decimal,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Geral (snapshot consistente dentro de uma transação)
    pub async fn get_summary(&self, owner: Option<Uuid>) -> Result<DashboardSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        // A. Negócios abertos no funil
        let open_deals = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM deals
            WHERE archived = FALSE
              AND status NOT IN ('closed', 'lost')
              AND ($1::uuid IS NULL OR created_by = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // B. Fechados no mês corrente
        let closed_this_month = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM deals
            WHERE status = 'closed'
              AND archived = FALSE
              AND date_trunc('month', status_updated_at) = date_trunc('month', NOW())
              AND ($1::uuid IS NULL OR created_by = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // C. Receita dos fechados no mês
        let revenue_this_month = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(price), 0) FROM deals
            WHERE status = 'closed'
              AND archived = FALSE
              AND date_trunc('month', status_updated_at) = date_trunc('month', NOW())
              AND ($1::uuid IS NULL OR created_by = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        // D. Follow-ups pendentes e atrasados
        let (pending_followups, overdue_followups) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending'),
                COUNT(*) FILTER (WHERE status = 'pending' AND reminder_date < CURRENT_DATE)
            FROM followups
            WHERE ($1::uuid IS NULL OR assigned_to = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            open_deals,
            closed_this_month,
            revenue_this_month,
            pending_followups,
            overdue_followups,
        })
    }

    // 2. Gráfico de Linha (Últimos 30 dias de fechamento)
    pub async fn get_sales_last_30_days(
        &self,
        owner: Option<Uuid>,
    ) -> Result<Vec<SalesChartEntry>, AppError> {
        let data = sqlx::query_as::<_, SalesChartEntry>(
            r#"
            SELECT
                to_char(status_updated_at, 'YYYY-MM-DD') as date,
                SUM(price) as total
            FROM deals
            WHERE status = 'closed'
              AND archived = FALSE
              AND status_updated_at >= (CURRENT_DATE - INTERVAL '30 days')
              AND ($1::uuid IS NULL OR created_by = $1)
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }

    // 3. Ranking de vendedores por receita fechada
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardRow>, AppError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                created_by as rep_id,
                created_by_name as rep_name,
                COUNT(*) as closed_count,
                COALESCE(SUM(price), 0) as revenue
            FROM deals
            WHERE status = 'closed' AND archived = FALSE
            GROUP BY created_by, created_by_name
            ORDER BY revenue DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
