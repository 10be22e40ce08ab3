// src/models/quotes.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
}

impl QuoteStatus {
    /// O ciclo só anda para frente: draft -> sent -> accepted.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent) | (QuoteStatus::Sent, QuoteStatus::Accepted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
        }
    }
}

// --- STRUCTS ---

/// Uma linha do orçamento. Fica como JSONB dentro do orçamento,
/// não como tabela própria.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    #[schema(example = "Instalação do sistema")]
    pub description: String,

    #[schema(example = "2.0")]
    pub quantity: Decimal,

    #[schema(example = "1500.00")]
    pub unit_price: Decimal,
}

/// Totais derivados. Calculados SEMPRE pela mesma função
/// (`quote_service::compute_totals`), nunca confiados do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub deal_id: Option<Uuid>,

    #[schema(example = "Padaria Estrela do Sul")]
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,

    #[schema(example = "ORC-202508-0001")]
    pub quote_number: String,
    pub title: String,

    #[schema(value_type = Vec<QuoteItem>)]
    pub items: Json<Vec<QuoteItem>>,

    pub subtotal: Decimal,
    /// Percentual em [0, 100].
    pub discount: Decimal,
    pub discount_amount: Decimal,
    /// Percentual em [0, 100].
    pub tax: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,

    pub status: QuoteStatus,

    pub terms: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-09-30")]
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
