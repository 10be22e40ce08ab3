// src/models/followups.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "followup_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FollowupStatus {
    Pending,
    Done,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "followup_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FollowupSource {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Followup {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub business_name: String,

    pub assigned_to: Uuid,
    pub assigned_to_name: String,

    #[schema(value_type = String, format = Date, example = "2025-08-20")]
    pub reminder_date: NaiveDate,

    #[schema(example = "Ligar para confirmar proposta")]
    pub next_action: Option<String>,
    pub notes: Option<String>,

    /// Valor gravado. O valor servido pela API é sempre o derivado
    /// (ver `effective_status`); o banco só muda em edição explícita.
    pub status: FollowupStatus,
    pub source: FollowupSource,

    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Followup {
    /// 'overdue' é um rótulo derivado na leitura: pendente com lembrete
    /// no passado. Um follow-up concluído nunca vira overdue.
    pub fn effective_status(&self, today: NaiveDate) -> FollowupStatus {
        match self.status {
            FollowupStatus::Pending if self.reminder_date < today => FollowupStatus::Overdue,
            other => other,
        }
    }

    /// Aplica o status derivado no próprio registro (para servir na API).
    pub fn with_effective_status(mut self, today: NaiveDate) -> Self {
        self.status = self.effective_status(today);
        self
    }
}

/// Resultado de uma varredura de follow-ups automáticos.
#[derive(Debug, Default, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoFollowupReport {
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn followup(status: FollowupStatus, reminder: NaiveDate) -> Followup {
        Followup {
            id: Uuid::new_v4(),
            deal_id: Uuid::new_v4(),
            business_name: "Padaria Estrela do Sul".into(),
            assigned_to: Uuid::new_v4(),
            assigned_to_name: "Maria".into(),
            reminder_date: reminder,
            next_action: None,
            notes: None,
            status,
            source: FollowupSource::Manual,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pending_in_the_past_reads_as_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let f = followup(FollowupStatus::Pending, today.pred_opt().unwrap());
        assert_eq!(f.effective_status(today), FollowupStatus::Overdue);
    }

    #[test]
    fn pending_today_stays_pending() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let f = followup(FollowupStatus::Pending, today);
        assert_eq!(f.effective_status(today), FollowupStatus::Pending);
    }

    #[test]
    fn done_never_becomes_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let f = followup(FollowupStatus::Done, today.pred_opt().unwrap());
        assert_eq!(f.effective_status(today), FollowupStatus::Done);
    }
}
