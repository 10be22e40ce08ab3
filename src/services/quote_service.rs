// src/services/quote_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{field_validation_error, AppError},
    db::{AuditRepository, QuoteRepository},
    models::{
        auth::User,
        quotes::{Quote, QuoteItem, QuoteStatus, QuoteTotals},
    },
    services::notification_service::{NotificationEvent, NotificationService},
};

/// A ÚNICA implementação da aritmética do orçamento. Criação, edição e PDF
/// passam todos por aqui.
///
/// subtotal = Σ qtd × preço; desconto e imposto são percentuais em [0, 100];
/// o imposto incide sobre o subtotal já descontado.
pub fn compute_totals(items: &[QuoteItem], discount: Decimal, tax: Decimal) -> QuoteTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.quantity * item.unit_price)
        .sum();
    let subtotal = subtotal.round_dp(2);

    let discount_amount = (subtotal * discount / Decimal::ONE_HUNDRED).round_dp(2);
    let tax_amount = ((subtotal - discount_amount) * tax / Decimal::ONE_HUNDRED).round_dp(2);

    // Composto a partir das parcelas já arredondadas: a identidade
    // total = subtotal - desconto + imposto fecha centavo a centavo.
    let total = subtotal - discount_amount + tax_amount;

    QuoteTotals {
        subtotal,
        discount_amount,
        tax_amount,
        total,
    }
}

fn validate_percent(field: &str, value: Decimal) -> Result<(), AppError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(field_validation_error(
            field,
            "invalid_percent",
            "O percentual deve estar entre 0 e 100.",
        ));
    }
    Ok(())
}

fn validate_items(items: &[QuoteItem]) -> Result<(), AppError> {
    for item in items {
        if item.quantity < Decimal::ZERO || item.unit_price < Decimal::ZERO {
            return Err(field_validation_error(
                "items",
                "negative_item",
                "Quantidade e preço unitário não podem ser negativos.",
            ));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    audit_repo: AuditRepository,
    notifications: NotificationService,
    pool: PgPool,
}

impl QuoteService {
    pub fn new(
        quote_repo: QuoteRepository,
        audit_repo: AuditRepository,
        notifications: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self {
            quote_repo,
            audit_repo,
            notifications,
            pool,
        }
    }

    /// Cria o orçamento com número sequencial do mês (ORC-AAAAMM-NNNN).
    /// Contador e INSERT saem na mesma transação.
    pub async fn create_quote(
        &self,
        deal_id: Option<Uuid>,
        client_name: &str,
        client_email: Option<&str>,
        client_phone: Option<&str>,
        title: &str,
        items: Vec<QuoteItem>,
        discount: Decimal,
        tax: Decimal,
        terms: Option<&str>,
        valid_until: Option<NaiveDate>,
        notes: Option<&str>,
        user: &User,
    ) -> Result<Quote, AppError> {
        validate_percent("discount", discount)?;
        validate_percent("tax", tax)?;
        validate_items(&items)?;

        let totals = compute_totals(&items, discount, tax);

        let mut tx = self.pool.begin().await?;

        let year_month = Utc::now().format("%Y%m").to_string();
        let sequence = self
            .quote_repo
            .next_quote_number(&mut *tx, &year_month)
            .await?;
        let quote_number = format!("ORC-{}-{:04}", year_month, sequence);

        let quote = self
            .quote_repo
            .create(
                &mut *tx,
                deal_id,
                client_name,
                client_email,
                client_phone,
                &quote_number,
                title,
                &items,
                discount,
                tax,
                totals,
                terms,
                valid_until,
                notes,
                user.id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🧾 Orçamento {} criado para {}", quote.quote_number, client_name);

        Ok(quote)
    }

    pub async fn get_quote(&self, id: Uuid) -> Result<Quote, AppError> {
        self.quote_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Orçamento"))
    }

    pub async fn list_quotes(&self, user: &User) -> Result<Vec<Quote>, AppError> {
        let owner = if user.role.sees_all_deals() {
            None
        } else {
            Some(user.id)
        };

        self.quote_repo.list(owner).await
    }

    /// Edição recalcula TODOS os totais no servidor; um orçamento aceito
    /// é imutável.
    pub async fn update_quote(
        &self,
        id: Uuid,
        client_name: &str,
        client_email: Option<&str>,
        client_phone: Option<&str>,
        title: &str,
        items: Vec<QuoteItem>,
        discount: Decimal,
        tax: Decimal,
        terms: Option<&str>,
        valid_until: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<Quote, AppError> {
        validate_percent("discount", discount)?;
        validate_percent("tax", tax)?;
        validate_items(&items)?;

        let current = self.get_quote(id).await?;
        if current.status == QuoteStatus::Accepted {
            return Err(AppError::InvalidTransition(
                "Orçamento aceito não pode ser editado.".to_string(),
            ));
        }

        let totals = compute_totals(&items, discount, tax);

        self.quote_repo
            .update_content(
                id,
                client_name,
                client_email,
                client_phone,
                title,
                &items,
                discount,
                tax,
                totals,
                terms,
                valid_until,
                notes,
            )
            .await
    }

    /// draft -> sent. O ciclo nunca anda para trás.
    pub async fn send_quote(&self, id: Uuid, user: &User) -> Result<Quote, AppError> {
        self.transition(id, QuoteStatus::Sent, user).await
    }

    /// sent -> accepted. Audita e avisa quem criou.
    pub async fn accept_quote(&self, id: Uuid, user: &User) -> Result<Quote, AppError> {
        self.transition(id, QuoteStatus::Accepted, user).await
    }

    async fn transition(
        &self,
        id: Uuid,
        next: QuoteStatus,
        user: &User,
    ) -> Result<Quote, AppError> {
        let current = self.get_quote(id).await?;

        if !current.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Orçamento '{}' não pode ir de {} para {}.",
                current.quote_number,
                current.status.as_str(),
                next.as_str()
            )));
        }

        let mut tx = self.pool.begin().await?;

        let updated = self.quote_repo.set_status(&mut *tx, id, next).await?;

        self.audit_repo
            .record(
                &mut *tx,
                "quote",
                id,
                "status_changed",
                user.id,
                &user.display_name,
                &json!({
                    "from": current.status.as_str(),
                    "to": next.as_str(),
                }),
            )
            .await?;

        if next == QuoteStatus::Accepted {
            self.notifications
                .notify(
                    &mut *tx,
                    updated.created_by,
                    NotificationEvent::QuoteAccepted {
                        quote_number: &updated.quote_number,
                        client_name: &updated.client_name,
                    },
                    Some(&format!("/quotes/{}", updated.id)),
                    json!({ "quoteId": updated.id }),
                )
                .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Exclusão definitiva, só admin.
    pub async fn delete_quote(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        if !user.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let affected = self.quote_repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Orçamento"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: &str, unit_price: &str) -> QuoteItem {
        QuoteItem {
            description: "Item".into(),
            quantity: quantity.parse().unwrap(),
            unit_price: unit_price.parse().unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn totals_match_worked_example() {
        // 2 × 1500 + 1 × 500 = 3500; 10% desc = 350; 5% imposto sobre 3150 = 157.50
        let items = vec![item("2", "1500.00"), item("1", "500.00")];
        let totals = compute_totals(&items, dec("10"), dec("5"));

        assert_eq!(totals.subtotal, dec("3500.00"));
        assert_eq!(totals.discount_amount, dec("350.00"));
        assert_eq!(totals.tax_amount, dec("157.50"));
        assert_eq!(totals.total, dec("3307.50"));
    }

    #[test]
    fn total_identity_holds_for_awkward_percentages() {
        // Percentuais que geram dízima: a identidade precisa fechar
        // porque o total é composto das parcelas já arredondadas.
        let items = vec![item("3", "33.33"), item("7", "19.99")];
        for (discount, tax) in [("0", "0"), ("7.5", "13.25"), ("33.33", "66.67"), ("100", "100")] {
            let totals = compute_totals(&items, dec(discount), dec(tax));
            assert_eq!(
                totals.total,
                totals.subtotal - totals.discount_amount + totals.tax_amount,
                "desconto {} imposto {}",
                discount,
                tax
            );
        }
    }

    #[test]
    fn empty_item_list_totals_zero() {
        let totals = compute_totals(&[], dec("10"), dec("5"));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn tax_applies_after_discount() {
        let items = vec![item("1", "1000.00")];
        let totals = compute_totals(&items, dec("50"), dec("10"));
        // imposto sobre 500, não sobre 1000
        assert_eq!(totals.tax_amount, dec("50.00"));
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Sent));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Accepted));

        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Accepted));
        assert!(!QuoteStatus::Sent.can_transition_to(QuoteStatus::Draft));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Sent));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Draft));
    }

    #[test]
    fn percent_bounds_are_validated() {
        assert!(validate_percent("discount", dec("-1")).is_err());
        assert!(validate_percent("discount", dec("100.01")).is_err());
        assert!(validate_percent("discount", dec("0")).is_ok());
        assert!(validate_percent("discount", dec("100")).is_ok());
    }
}
