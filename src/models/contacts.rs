// src/models/contacts.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Contato de prospecção: empresa ainda sem negócio ativo.
// A unicidade de company_name (sem case) é garantida por índice no banco.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,

    #[schema(example = "Padaria Estrela do Sul")]
    pub company_name: String,

    #[schema(example = "João Pereira")]
    pub contact_name: Option<String>,
    pub contact_position: Option<String>,

    #[schema(example = "+55 11 98888-0000")]
    pub phone: Option<String>,
    pub email: Option<String>,

    #[schema(example = "alimentação")]
    pub category: Option<String>,
    pub notes: Option<String>,

    pub created_by: Uuid,
    pub created_by_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resultado da consulta de trava: existe negócio ativo para esse contato?
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactLockStatus {
    pub in_progress: bool,
    /// O negócio ativo que segura a trava, quando houver.
    pub deal_id: Option<Uuid>,
    pub deal_owner_name: Option<String>,
}

/// Relatório da importação de CSV: continuação por registro,
/// nunca transação compensatória.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Mensagens por linha com problema (linha 1 = cabeçalho).
    pub errors: Vec<String>,
}
