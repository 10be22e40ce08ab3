// src/models/visits.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub business_name: String,

    pub sales_rep_id: Uuid,
    pub sales_rep_name: String,

    pub address: Option<String>,

    #[schema(value_type = String, format = Date, example = "2025-08-15")]
    pub visit_date: NaiveDate,

    #[schema(example = "Apresentação da proposta")]
    pub purpose: Option<String>,
    pub result: Option<String>,
    pub next_step: Option<String>,

    pub created_at: DateTime<Utc>,
}
