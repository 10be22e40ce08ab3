// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Resumo (Os Cards do Topo)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub open_deals: i64,            // Negócios ativos no funil
    pub closed_this_month: i64,     // Fechados no mês corrente
    pub revenue_this_month: Decimal, // Receita dos fechados no mês
    pub pending_followups: i64,
    pub overdue_followups: i64, // Pendentes com lembrete no passado
}

// 2. Gráfico de Vendas (Últimos 30 dias)
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesChartEntry {
    pub date: Option<String>, // O SQL retorna a data como string (YYYY-MM-DD)
    pub total: Option<Decimal>,
}

// 3. Ranking de vendedores
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rep_id: Uuid,
    pub rep_name: String,
    pub closed_count: i64,
    pub revenue: Decimal,
    /// Comissão flat de 20% sobre a receita fechada
    /// (ver decisão registrada no DESIGN.md).
    pub commission: Decimal,
}

// 4. Saúde do cliente (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Critical,
    AtRisk,
    Normal,
    Healthy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientHealth {
    #[schema(example = "Padaria Estrela do Sul")]
    pub client_name: String,

    #[schema(example = 75)]
    pub score: i32,
    pub status: HealthStatus,

    pub deal_count: u32,
    pub total_revenue: Decimal,
    pub closed_count: u32,
    pub open_count: u32,

    /// Data do negócio mais recente ("último contato").
    pub last_contact: Option<DateTime<Utc>>,

    /// Sugestões geradas por checagens independentes (podem coexistir).
    pub recommendations: Vec<String>,
}
