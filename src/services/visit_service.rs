// src/services/visit_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DealRepository, VisitRepository},
    models::{auth::User, visits::Visit},
};

#[derive(Clone)]
pub struct VisitService {
    visit_repo: VisitRepository,
    deal_repo: DealRepository,
}

impl VisitService {
    pub fn new(visit_repo: VisitRepository, deal_repo: DealRepository) -> Self {
        Self {
            visit_repo,
            deal_repo,
        }
    }

    /// O nome da empresa é denormalizado do negócio no momento do registro.
    pub async fn register_visit(
        &self,
        deal_id: Uuid,
        address: Option<&str>,
        visit_date: NaiveDate,
        purpose: Option<&str>,
        result: Option<&str>,
        next_step: Option<&str>,
        user: &User,
    ) -> Result<Visit, AppError> {
        let deal = self
            .deal_repo
            .find_by_id(deal_id)
            .await?
            .ok_or(AppError::NotFound("Negócio"))?;

        self.visit_repo
            .create(
                deal.id,
                &deal.business_name,
                user.id,
                &user.display_name,
                address,
                visit_date,
                purpose,
                result,
                next_step,
            )
            .await
    }

    pub async fn list_for_deal(&self, deal_id: Uuid) -> Result<Vec<Visit>, AppError> {
        self.visit_repo.list_for_deal(deal_id).await
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<Visit>, AppError> {
        self.visit_repo.list_for_rep(user.id).await
    }

    pub async fn delete(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        if !user.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let affected = self.visit_repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Visita"));
        }
        Ok(())
    }
}
