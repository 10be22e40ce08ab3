// src/services/dashboard_service.rs

use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{cache::TtlCache, error::AppError},
    db::DashboardRepository,
    models::{
        auth::User,
        dashboard::{DashboardSummary, LeaderboardEntry, SalesChartEntry},
    },
};

const SUMMARY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Comissão flat de 20% sobre a receita fechada. O plano escalonado de
/// 5%/10% só existia em material de divulgação e nunca foi implementado;
/// a decisão de manter a taxa observada está registrada no DESIGN.md.
const COMMISSION_RATE_PERCENT: u32 = 20;

pub fn commission_for(revenue: Decimal) -> Decimal {
    (revenue * Decimal::from(COMMISSION_RATE_PERCENT) / Decimal::ONE_HUNDRED).round_dp(2)
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    cache: TtlCache,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, cache: TtlCache) -> Self {
        Self { repo, cache }
    }

    fn owner_scope(user: &User) -> Option<Uuid> {
        if user.role.sees_all_deals() {
            None
        } else {
            Some(user.id)
        }
    }

    /// Resumo dos cards, com 60s de cache por escopo.
    pub async fn get_summary(&self, user: &User) -> Result<DashboardSummary, AppError> {
        let owner = Self::owner_scope(user);
        let cache_key = match owner {
            Some(id) => format!("dashboard:summary:{}", id),
            None => "dashboard:summary:all".to_string(),
        };

        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(summary) = serde_json::from_value(cached) {
                return Ok(summary);
            }
        }

        let summary = self.repo.get_summary(owner).await?;

        if let Ok(value) = serde_json::to_value(&summary) {
            self.cache.put(cache_key, value, SUMMARY_CACHE_TTL);
        }

        Ok(summary)
    }

    pub async fn get_sales_chart(&self, user: &User) -> Result<Vec<SalesChartEntry>, AppError> {
        self.repo.get_sales_last_30_days(Self::owner_scope(user)).await
    }

    /// Ranking por receita fechada, com a comissão derivada por vendedor.
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = self.repo.get_leaderboard().await?;

        Ok(rows
            .into_iter()
            .map(|row| LeaderboardEntry {
                rep_id: row.rep_id,
                rep_name: row.rep_name,
                closed_count: row.closed_count,
                revenue: row.revenue,
                commission: commission_for(row.revenue),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn commission_is_flat_twenty_percent() {
        assert_eq!(commission_for(dec("1000.00")), dec("200.00"));
        assert_eq!(commission_for(dec("0")), dec("0"));
        assert_eq!(commission_for(dec("15333.33")), dec("3066.67"));
    }
}
