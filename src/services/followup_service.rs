// src/services/followup_service.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DealRepository, FollowupRepository},
    models::{
        auth::User,
        deals::{Deal, DealStatus},
        followups::{AutoFollowupReport, Followup, FollowupSource, FollowupStatus},
    },
    services::notification_service::{NotificationEvent, NotificationService},
};

/// Dias que um negócio pode ficar parado numa etapa antes do lembrete.
/// Etapas de entrada/saída do funil têm SLA mais curto; o resto usa 7.
fn sla_days(stage: DealStatus) -> i64 {
    match stage {
        DealStatus::PotentialClient | DealStatus::PendingApproval => 5,
        _ => 7,
    }
}

/// Decisão da varredura para um negócio. Função pura: todo o critério de
/// "cria ou pula" mora aqui; o banco só arbitra a corrida do carimbo.
#[derive(Debug, PartialEq, Eq)]
enum SweepDecision {
    Create { days_in_stage: i64 },
    Skip(SkipReason),
}

#[derive(Debug, PartialEq, Eq)]
enum SkipReason {
    /// Arquivado, fechado ou perdido: fora do radar do SLA.
    Inactive,
    NotOwner,
    WithinSla,
    /// Já existe lembrete automático desta mesma etapa dentro da janela.
    AlreadyReminded,
}

fn evaluate_deal(deal: &Deal, owner: Uuid, now: DateTime<Utc>) -> SweepDecision {
    if deal.archived || deal.status.is_terminal() {
        return SweepDecision::Skip(SkipReason::Inactive);
    }

    if deal.created_by != owner {
        return SweepDecision::Skip(SkipReason::NotOwner);
    }

    let days_in_stage = deal.days_in_stage(now);
    let sla = sla_days(deal.status);

    if days_in_stage < sla {
        return SweepDecision::Skip(SkipReason::WithinSla);
    }

    // Supressão re-entrante: mesma etapa + carimbo dentro da janela do SLA
    if deal.last_auto_follow_up_stage == Some(deal.status) {
        if let Some(stamped_at) = deal.last_auto_follow_up_at {
            if stamped_at > now - Duration::days(sla) {
                return SweepDecision::Skip(SkipReason::AlreadyReminded);
            }
        }
    }

    SweepDecision::Create { days_in_stage }
}

#[derive(Clone)]
pub struct FollowupService {
    deal_repo: DealRepository,
    followup_repo: FollowupRepository,
    notifications: NotificationService,
    pool: PgPool,
}

impl FollowupService {
    pub fn new(
        deal_repo: DealRepository,
        followup_repo: FollowupRepository,
        notifications: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self {
            deal_repo,
            followup_repo,
            notifications,
            pool,
        }
    }

    // =========================================================================
    //  VARREDURA AUTOMÁTICA (SLA)
    // =========================================================================

    /// Varre os negócios abertos de um dono e garante um follow-up pendente
    /// para cada um que estourou o SLA da etapa. Melhor esforço: a falha de
    /// um negócio é logada e a varredura continua.
    pub async fn run_auto_followups(
        &self,
        owner_id: Uuid,
        owner_name: &str,
    ) -> Result<AutoFollowupReport, AppError> {
        let deals = self.deal_repo.list_active_owned(owner_id).await?;
        let now = Utc::now();

        let mut report = AutoFollowupReport::default();

        for deal in deals {
            match evaluate_deal(&deal, owner_id, now) {
                SweepDecision::Skip(_) => report.skipped += 1,
                SweepDecision::Create { days_in_stage } => {
                    match self.create_auto_followup(&deal, days_in_stage, now).await {
                        // false = outra varredura carimbou primeiro
                        // (requisição concorrente ou outra instância)
                        Ok(created) => {
                            if created {
                                report.created += 1;
                            } else {
                                report.skipped += 1;
                            }
                        }
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!(
                                "Falha no follow-up automático do negócio {}: {}",
                                deal.id,
                                e
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            "🤖 Varredura de SLA de {}: {} criados, {} pulados, {} com falha",
            owner_name,
            report.created,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// Passada global da tarefa de fundo: um relatório agregado de todos os
    /// donos com negócio aberto.
    pub async fn sweep_all(&self) -> Result<AutoFollowupReport, AppError> {
        let owners = self.deal_repo.distinct_active_owners().await?;

        let mut total = AutoFollowupReport::default();
        for (owner_id, owner_name) in owners {
            match self.run_auto_followups(owner_id, &owner_name).await {
                Ok(report) => {
                    total.created += report.created;
                    total.skipped += report.skipped;
                    total.failed += report.failed;
                }
                Err(e) => {
                    total.failed += 1;
                    tracing::warn!("Varredura de SLA falhou para {}: {}", owner_name, e);
                }
            }
        }

        Ok(total)
    }

    /// O carimbo condicional e o INSERT saem na mesma transação:
    /// "no máximo um por janela de SLA" é decidido pelo banco.
    async fn create_auto_followup(
        &self,
        deal: &Deal,
        days_in_stage: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let window_start = now - Duration::days(sla_days(deal.status));
        let claimed = self
            .deal_repo
            .claim_auto_followup(&mut *tx, deal.id, deal.status, window_start)
            .await?;

        if claimed == 0 {
            return Ok(false); // rollback implícito no drop da transação
        }

        let reminder_date = (now + Duration::days(1)).date_naive();
        let notes = format!(
            "Negócio há {} dias na etapa '{}' sem avanço. Lembrete gerado automaticamente.",
            days_in_stage,
            deal.status.label()
        );

        self.followup_repo
            .create(
                &mut *tx,
                deal.id,
                &deal.business_name,
                deal.created_by,
                &deal.created_by_name,
                reminder_date,
                Some("Retomar contato com o cliente"),
                Some(&notes),
                FollowupSource::Auto,
            )
            .await?;

        self.notifications
            .notify(
                &mut *tx,
                deal.created_by,
                NotificationEvent::FollowupCreated {
                    business_name: &deal.business_name,
                    days_in_stage,
                },
                Some(&format!("/deals/{}", deal.id)),
                json!({ "dealId": deal.id, "stage": deal.status.as_str() }),
            )
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    // =========================================================================
    //  CRUD MANUAL
    // =========================================================================

    pub async fn create_manual(
        &self,
        deal_id: Uuid,
        reminder_date: NaiveDate,
        next_action: Option<&str>,
        notes: Option<&str>,
        user: &User,
    ) -> Result<Followup, AppError> {
        let deal = self
            .deal_repo
            .find_by_id(deal_id)
            .await?
            .ok_or(AppError::NotFound("Negócio"))?;

        self.followup_repo
            .create(
                &self.pool,
                deal.id,
                &deal.business_name,
                user.id,
                &user.display_name,
                reminder_date,
                next_action,
                notes,
                FollowupSource::Manual,
            )
            .await
    }

    /// Lista do usuário com o status derivado aplicado ('overdue' nasce
    /// na leitura).
    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<Followup>, AppError> {
        let today = Utc::now().date_naive();
        let followups = self.followup_repo.list_for_user(user_id).await?;

        Ok(followups
            .into_iter()
            .map(|f| f.with_effective_status(today))
            .collect())
    }

    pub async fn list_for_deal(&self, deal_id: Uuid) -> Result<Vec<Followup>, AppError> {
        let today = Utc::now().date_naive();
        let followups = self.followup_repo.list_for_deal(deal_id).await?;

        Ok(followups
            .into_iter()
            .map(|f| f.with_effective_status(today))
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        reminder_date: Option<NaiveDate>,
        next_action: Option<&str>,
        notes: Option<&str>,
        status: Option<FollowupStatus>,
        user: &User,
    ) -> Result<Followup, AppError> {
        self.ensure_assignee(id, user).await?;

        self.followup_repo
            .update(id, reminder_date, next_action, notes, status)
            .await
    }

    pub async fn complete(&self, id: Uuid, user: &User) -> Result<Followup, AppError> {
        self.ensure_assignee(id, user).await?;
        self.followup_repo.complete(id).await
    }

    pub async fn delete(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        self.ensure_assignee(id, user).await?;

        let affected = self.followup_repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Follow-up"));
        }
        Ok(())
    }

    /// Só o responsável (ou quem enxerga tudo) mexe num follow-up.
    async fn ensure_assignee(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        let followup = self
            .followup_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Follow-up"))?;

        if !user.role.sees_all_deals() && followup.assigned_to != user.id {
            return Err(AppError::Forbidden);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn deal_in_stage(status: DealStatus, days_ago: i64, owner: Uuid, now: DateTime<Utc>) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            business_name: "Padaria Estrela do Sul".into(),
            contact_person: None,
            phone_number: None,
            email: None,
            status,
            price: Decimal::ZERO,
            notes: None,
            archived: false,
            source_contact_id: None,
            created_by: owner,
            created_by_name: "Maria".into(),
            status_updated_at: now - Duration::days(days_ago),
            last_auto_follow_up_at: None,
            last_auto_follow_up_stage: None,
            edit_history: serde_json::json!([]),
            created_at: now - Duration::days(days_ago),
            updated_at: now,
        }
    }

    #[test]
    fn sla_table_matches_policy() {
        assert_eq!(sla_days(DealStatus::PotentialClient), 5);
        assert_eq!(sla_days(DealStatus::PendingApproval), 5);
        assert_eq!(sla_days(DealStatus::Negotiation), 7);
        assert_eq!(sla_days(DealStatus::Contacted), 7);
    }

    #[test]
    fn creates_after_sla_elapsed() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let deal = deal_in_stage(DealStatus::PotentialClient, 6, owner, now);

        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Create { days_in_stage: 6 }
        );
    }

    #[test]
    fn skips_within_sla() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let deal = deal_in_stage(DealStatus::PotentialClient, 4, owner, now);

        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Skip(SkipReason::WithinSla)
        );
    }

    #[test]
    fn default_sla_is_seven_days() {
        let now = Utc::now();
        let owner = Uuid::new_v4();

        let early = deal_in_stage(DealStatus::Negotiation, 6, owner, now);
        assert_eq!(
            evaluate_deal(&early, owner, now),
            SweepDecision::Skip(SkipReason::WithinSla)
        );

        let late = deal_in_stage(DealStatus::Negotiation, 7, owner, now);
        assert_eq!(
            evaluate_deal(&late, owner, now),
            SweepDecision::Create { days_in_stage: 7 }
        );
    }

    #[test]
    fn skips_terminal_and_archived_deals() {
        let now = Utc::now();
        let owner = Uuid::new_v4();

        let closed = deal_in_stage(DealStatus::Closed, 30, owner, now);
        assert_eq!(
            evaluate_deal(&closed, owner, now),
            SweepDecision::Skip(SkipReason::Inactive)
        );

        let mut archived = deal_in_stage(DealStatus::Proposal, 30, owner, now);
        archived.archived = true;
        assert_eq!(
            evaluate_deal(&archived, owner, now),
            SweepDecision::Skip(SkipReason::Inactive)
        );
    }

    #[test]
    fn skips_deals_of_other_owners() {
        let now = Utc::now();
        let deal = deal_in_stage(DealStatus::PotentialClient, 10, Uuid::new_v4(), now);

        assert_eq!(
            evaluate_deal(&deal, Uuid::new_v4(), now),
            SweepDecision::Skip(SkipReason::NotOwner)
        );
    }

    #[test]
    fn rerun_right_after_stamp_is_suppressed() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let mut deal = deal_in_stage(DealStatus::PotentialClient, 6, owner, now);

        // Primeira varredura criaria
        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Create { days_in_stage: 6 }
        );

        // Simula o carimbo gravado pela primeira varredura
        deal.last_auto_follow_up_at = Some(now);
        deal.last_auto_follow_up_stage = Some(DealStatus::PotentialClient);

        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Skip(SkipReason::AlreadyReminded)
        );
    }

    #[test]
    fn stamp_of_previous_stage_does_not_suppress() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let mut deal = deal_in_stage(DealStatus::PendingApproval, 6, owner, now);

        deal.last_auto_follow_up_at = Some(now - Duration::days(1));
        deal.last_auto_follow_up_stage = Some(DealStatus::PotentialClient);

        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Create { days_in_stage: 6 }
        );
    }

    #[test]
    fn stamp_outside_window_allows_new_reminder() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let mut deal = deal_in_stage(DealStatus::PotentialClient, 12, owner, now);

        deal.last_auto_follow_up_at = Some(now - Duration::days(6));
        deal.last_auto_follow_up_stage = Some(DealStatus::PotentialClient);

        assert_eq!(
            evaluate_deal(&deal, owner, now),
            SweepDecision::Create { days_in_stage: 12 }
        );
    }
}
