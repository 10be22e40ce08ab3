// src/services/notification_service.rs

use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    models::{
        deals::DealStatus,
        notifications::{Notification, NotificationKind, NotificationPriority},
    },
};

/// Eventos que geram notificação. O texto sai sempre do `match` abaixo.
#[derive(Debug)]
pub enum NotificationEvent<'a> {
    FollowupCreated {
        business_name: &'a str,
        days_in_stage: i64,
    },
    FollowupOverdue {
        business_name: &'a str,
    },
    DealStatusChanged {
        business_name: &'a str,
        new_status: DealStatus,
        changed_by: &'a str,
    },
    QuoteAccepted {
        quote_number: &'a str,
        client_name: &'a str,
    },
}

impl NotificationEvent<'_> {
    fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::FollowupCreated { .. } => NotificationKind::FollowupCreated,
            NotificationEvent::FollowupOverdue { .. } => NotificationKind::FollowupOverdue,
            NotificationEvent::DealStatusChanged { .. } => NotificationKind::DealStatusChanged,
            NotificationEvent::QuoteAccepted { .. } => NotificationKind::QuoteAccepted,
        }
    }

    fn priority(&self) -> NotificationPriority {
        match self {
            NotificationEvent::FollowupOverdue { .. } => NotificationPriority::High,
            _ => NotificationPriority::Normal,
        }
    }

    fn message(&self) -> String {
        match self {
            NotificationEvent::FollowupCreated {
                business_name,
                days_in_stage,
            } => format!(
                "Lembrete automático: {} está há {} dias na mesma etapa.",
                business_name, days_in_stage
            ),
            NotificationEvent::FollowupOverdue { business_name } => {
                format!("Follow-up atrasado para {}.", business_name)
            }
            NotificationEvent::DealStatusChanged {
                business_name,
                new_status,
                changed_by,
            } => format!(
                "{} moveu o negócio {} para a etapa {}.",
                changed_by,
                business_name,
                new_status.label()
            ),
            NotificationEvent::QuoteAccepted {
                quote_number,
                client_name,
            } => format!(
                "Orçamento {} aceito por {}.",
                quote_number, client_name
            ),
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    /// Insere a notificação. Recebe executor para poder entrar na transação
    /// do evento que a originou.
    pub async fn notify<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        event: NotificationEvent<'_>,
        action_url: Option<&str>,
        metadata: Value,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create(
                executor,
                user_id,
                &event.message(),
                event.kind(),
                event.priority(),
                action_url,
                &metadata,
            )
            .await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let affected = self.repo.mark_read(id, user_id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Notificação"));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.repo.mark_all_read(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followup_created_message_carries_day_count() {
        let event = NotificationEvent::FollowupCreated {
            business_name: "Padaria Estrela do Sul",
            days_in_stage: 6,
        };
        let msg = event.message();
        assert!(msg.contains("6 dias"));
        assert!(msg.contains("Padaria Estrela do Sul"));
        assert_eq!(event.kind(), NotificationKind::FollowupCreated);
    }

    #[test]
    fn overdue_event_is_high_priority() {
        let event = NotificationEvent::FollowupOverdue {
            business_name: "Padaria Estrela do Sul",
        };
        assert_eq!(event.priority(), NotificationPriority::High);
    }
}
