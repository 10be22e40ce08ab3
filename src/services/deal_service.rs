// src/services/deal_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        cache::TtlCache,
        error::{field_validation_error, AppError},
    },
    db::{AuditRepository, DealRepository},
    models::{
        audit::AuditLog,
        auth::User,
        deals::{Deal, DealStatus},
    },
    services::notification_service::{NotificationEvent, NotificationService},
};

#[derive(Clone)]
pub struct DealService {
    deal_repo: DealRepository,
    audit_repo: AuditRepository,
    notifications: NotificationService,
    cache: TtlCache,
    pool: PgPool,
}

impl DealService {
    pub fn new(
        deal_repo: DealRepository,
        audit_repo: AuditRepository,
        notifications: NotificationService,
        cache: TtlCache,
        pool: PgPool,
    ) -> Self {
        Self {
            deal_repo,
            audit_repo,
            notifications,
            cache,
            pool,
        }
    }

    /// Qualquer mutação de negócio invalida os agregados derivados dele.
    fn invalidate_aggregates(&self) {
        self.cache.invalidate_prefix("dashboard:");
        self.cache.invalidate_prefix("analytics:");
    }

    pub async fn create_deal(
        &self,
        business_name: &str,
        contact_person: Option<&str>,
        phone_number: Option<&str>,
        email: Option<&str>,
        status: Option<DealStatus>,
        price: Decimal,
        notes: Option<&str>,
        user: &User,
    ) -> Result<Deal, AppError> {
        if price < Decimal::ZERO {
            return Err(field_validation_error(
                "price",
                "negative_price",
                "O valor do negócio não pode ser negativo.",
            ));
        }

        let deal = self
            .deal_repo
            .create(
                &self.pool,
                business_name,
                contact_person,
                phone_number,
                email,
                status.unwrap_or(DealStatus::PotentialClient),
                price,
                notes,
                None, // negócio avulso, sem contato de origem
                user.id,
                &user.display_name,
            )
            .await?;

        self.invalidate_aggregates();

        Ok(deal)
    }

    /// Escopo por papel: vendedor enxerga só a própria carteira.
    pub async fn list_deals(&self, user: &User, include_archived: bool) -> Result<Vec<Deal>, AppError> {
        let owner = if user.role.sees_all_deals() {
            None
        } else {
            Some(user.id)
        };

        self.deal_repo.list(owner, include_archived).await
    }

    pub async fn get_deal(&self, id: Uuid, user: &User) -> Result<Deal, AppError> {
        let deal = self
            .deal_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Negócio"))?;

        if !user.role.sees_all_deals() && deal.created_by != user.id {
            return Err(AppError::Forbidden);
        }

        Ok(deal)
    }

    /// Atualização parcial com trilha de edição. Mudança de etapa re-carimba
    /// status_updated_at (a base do SLA), audita e avisa o dono quando a
    /// mudança veio de outra pessoa.
    pub async fn update_deal(
        &self,
        id: Uuid,
        business_name: Option<&str>,
        contact_person: Option<&str>,
        phone_number: Option<&str>,
        email: Option<&str>,
        price: Option<Decimal>,
        notes: Option<&str>,
        status: Option<DealStatus>,
        user: &User,
    ) -> Result<Deal, AppError> {
        if let Some(p) = price {
            if p < Decimal::ZERO {
                return Err(field_validation_error(
                    "price",
                    "negative_price",
                    "O valor do negócio não pode ser negativo.",
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let current = self
            .deal_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Negócio"))?;

        if !user.role.sees_all_deals() && current.created_by != user.id {
            return Err(AppError::Forbidden);
        }

        let status_changed = matches!(status, Some(s) if s != current.status);

        // Entrada appendada em edit_history (array com um elemento,
        // porque `||` de jsonb concatena arrays)
        let history_entry = json!([{
            "editedBy": user.display_name,
            "editedById": user.id,
            "editedAt": Utc::now(),
            "statusFrom": status_changed.then(|| current.status.as_str()),
            "statusTo": status.map(|s| s.as_str()),
        }]);

        let updated = self
            .deal_repo
            .update(
                &mut *tx,
                id,
                business_name,
                contact_person,
                phone_number,
                email,
                price,
                notes,
                status,
                &history_entry,
            )
            .await?;

        if status_changed {
            self.audit_repo
                .record(
                    &mut *tx,
                    "deal",
                    id,
                    "status_changed",
                    user.id,
                    &user.display_name,
                    &json!({
                        "from": current.status.as_str(),
                        "to": updated.status.as_str(),
                    }),
                )
                .await?;

            // Dono avisado quando a mudança veio de um gerente
            if updated.created_by != user.id {
                self.notifications
                    .notify(
                        &mut *tx,
                        updated.created_by,
                        NotificationEvent::DealStatusChanged {
                            business_name: &updated.business_name,
                            new_status: updated.status,
                            changed_by: &user.display_name,
                        },
                        Some(&format!("/deals/{}", updated.id)),
                        json!({ "dealId": updated.id }),
                    )
                    .await?;
            }
        }

        tx.commit().await?;

        self.invalidate_aggregates();

        Ok(updated)
    }

    /// Trilha de auditoria do negócio (mudanças de etapa, arquivamento, etc).
    pub async fn list_audit(&self, id: Uuid, user: &User) -> Result<Vec<AuditLog>, AppError> {
        // Mesmo escopo de visibilidade do próprio negócio
        self.get_deal(id, user).await?;
        self.audit_repo.list_for_entity("deal", id).await
    }

    /// Arquivar tira o negócio do funil (e solta a trava do contato)
    /// sem apagar histórico.
    pub async fn archive_deal(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        // Reusa a checagem de escopo
        self.get_deal(id, user).await?;

        let affected = self.deal_repo.set_archived(id, true).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Negócio"));
        }

        self.audit_repo
            .record(
                &self.pool,
                "deal",
                id,
                "archived",
                user.id,
                &user.display_name,
                &json!({}),
            )
            .await?;

        self.invalidate_aggregates();

        Ok(())
    }

    /// Exclusão definitiva, só admin.
    pub async fn delete_deal(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        if !user.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let affected = self.deal_repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Negócio"));
        }

        self.audit_repo
            .record(
                &self.pool,
                "deal",
                id,
                "deleted",
                user.id,
                &user.display_name,
                &json!({}),
            )
            .await?;

        self.invalidate_aggregates();

        Ok(())
    }
}
