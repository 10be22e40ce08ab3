// src/models/deals.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// O funil inteiro num tipo só, fechado no banco e no Rust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    PotentialClient,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    PendingApproval,
    Closed,
    Lost,
}

impl DealStatus {
    /// Negócio encerrado: solta a trava do contato e sai do radar do SLA.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStatus::Closed | DealStatus::Lost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::PotentialClient => "potential_client",
            DealStatus::Contacted => "contacted",
            DealStatus::Qualified => "qualified",
            DealStatus::Proposal => "proposal",
            DealStatus::Negotiation => "negotiation",
            DealStatus::PendingApproval => "pending_approval",
            DealStatus::Closed => "closed",
            DealStatus::Lost => "lost",
        }
    }

    /// Nome da etapa para mensagens e lembretes.
    pub fn label(&self) -> &'static str {
        match self {
            DealStatus::PotentialClient => "Cliente Potencial",
            DealStatus::Contacted => "Contatado",
            DealStatus::Qualified => "Qualificado",
            DealStatus::Proposal => "Proposta",
            DealStatus::Negotiation => "Negociação",
            DealStatus::PendingApproval => "Aguardando Aprovação",
            DealStatus::Closed => "Fechado",
            DealStatus::Lost => "Perdido",
        }
    }
}

// --- STRUCTS ---

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,

    #[schema(example = "Padaria Estrela do Sul")]
    pub business_name: String,
    pub contact_person: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,

    pub status: DealStatus,

    #[schema(example = "15000.00")]
    pub price: Decimal,
    pub notes: Option<String>,

    pub archived: bool,

    /// Contato de origem: enquanto o negócio está ativo, trava o contato.
    pub source_contact_id: Option<Uuid>,

    pub created_by: Uuid,
    pub created_by_name: String,

    /// Carimbo da última mudança de etapa; é a base do cálculo de SLA.
    pub status_updated_at: DateTime<Utc>,

    // Supressão de lembretes automáticos repetidos (mesma etapa, mesma janela)
    pub last_auto_follow_up_at: Option<DateTime<Utc>>,
    pub last_auto_follow_up_stage: Option<DealStatus>,

    /// Trilha de edições, appendada a cada update.
    #[schema(value_type = Vec<Object>)]
    pub edit_history: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// Um negócio ativo participa da trava de contato e do SLA.
    pub fn is_active(&self) -> bool {
        !self.archived && !self.status.is_terminal()
    }

    /// Dias corridos na etapa atual. O carimbo nasce junto com o negócio,
    /// então para negócios nunca movidos isso conta desde a criação.
    pub fn days_in_stage(&self, now: DateTime<Utc>) -> i64 {
        (now - self.status_updated_at).num_days()
    }
}
