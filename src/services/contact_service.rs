// src/services/contact_service.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, ContactRepository, DealRepository},
    models::{
        auth::User,
        contacts::{Contact, ContactLockStatus, ImportReport},
        deals::{Deal, DealStatus},
    },
};

/// Uma linha do CSV de contatos (mesmo shape na importação e na exportação).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvContactRow {
    company_name: String,
    contact_name: Option<String>,
    contact_position: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    category: Option<String>,
    notes: Option<String>,
}

#[derive(Clone)]
pub struct ContactService {
    contact_repo: ContactRepository,
    deal_repo: DealRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl ContactService {
    pub fn new(
        contact_repo: ContactRepository,
        deal_repo: DealRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            contact_repo,
            deal_repo,
            audit_repo,
            pool,
        }
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create_contact(
        &self,
        company_name: &str,
        contact_name: Option<&str>,
        contact_position: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        category: Option<&str>,
        notes: Option<&str>,
        user: &User,
    ) -> Result<Contact, AppError> {
        self.contact_repo
            .create(
                company_name,
                contact_name,
                contact_position,
                phone,
                email,
                category,
                notes,
                user.id,
                &user.display_name,
            )
            .await
    }

    pub async fn list_contacts(&self, search: Option<&str>) -> Result<Vec<Contact>, AppError> {
        self.contact_repo.list(search).await
    }

    pub async fn get_contact(&self, id: Uuid) -> Result<Contact, AppError> {
        self.contact_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Contato"))
    }

    /// Atualização com proteção de edição: se o contato está travado por um
    /// negócio ativo, telefone e e-mail NÃO mudam; os valores gravados
    /// sobrescrevem o que veio no payload.
    pub async fn update_contact(
        &self,
        id: Uuid,
        company_name: Option<&str>,
        contact_name: Option<&str>,
        contact_position: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        category: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Contact, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .contact_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Contato"))?;

        let locked = self
            .deal_repo
            .find_active_for_contact(
                &mut *tx,
                current.id,
                &current.company_name,
                current.phone.as_deref(),
            )
            .await?
            .is_some();

        let (final_phone, final_email) = if locked {
            (current.phone.as_deref(), current.email.as_deref())
        } else {
            (
                phone.or(current.phone.as_deref()),
                email.or(current.email.as_deref()),
            )
        };

        let updated = self
            .contact_repo
            .update(
                &mut *tx,
                id,
                company_name.unwrap_or(&current.company_name),
                contact_name.or(current.contact_name.as_deref()),
                contact_position.or(current.contact_position.as_deref()),
                final_phone,
                final_email,
                category.or(current.category.as_deref()),
                notes.or(current.notes.as_deref()),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Exclusão definitiva, só admin.
    pub async fn delete_contact(&self, id: Uuid, user: &User) -> Result<(), AppError> {
        if !user.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let contact = self.get_contact(id).await?;

        let affected = self.contact_repo.delete(id).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Contato"));
        }

        self.audit_repo
            .record(
                &self.pool,
                "contact",
                id,
                "deleted",
                user.id,
                &user.display_name,
                &json!({ "companyName": contact.company_name }),
            )
            .await?;

        Ok(())
    }

    // =========================================================================
    //  TRAVA DE CONTATO
    // =========================================================================

    /// Existe negócio ativo para este contato? (id OU empresa+telefone)
    pub async fn lock_status(&self, contact_id: Uuid) -> Result<ContactLockStatus, AppError> {
        let contact = self.get_contact(contact_id).await?;

        let active = self
            .deal_repo
            .find_active_for_contact(
                &self.pool,
                contact.id,
                &contact.company_name,
                contact.phone.as_deref(),
            )
            .await?;

        Ok(match active {
            Some(deal) => ContactLockStatus {
                in_progress: true,
                deal_id: Some(deal.id),
                deal_owner_name: Some(deal.created_by_name),
            },
            None => ContactLockStatus {
                in_progress: false,
                deal_id: None,
                deal_owner_name: None,
            },
        })
    }

    /// "Começar a trabalhar": re-checa a trava e cria o negócio DENTRO da
    /// mesma transação. A corrida pelo mesmo contato é decidida pelo índice
    /// único parcial; o perdedor recebe ContactLocked, nunca um duplicado.
    pub async fn start_working_on_contact(
        &self,
        contact_id: Uuid,
        user: &User,
    ) -> Result<Deal, AppError> {
        let mut tx = self.pool.begin().await?;

        let contact = self
            .contact_repo
            .find_by_id(&mut *tx, contact_id)
            .await?
            .ok_or(AppError::NotFound("Contato"))?;

        if let Some(existing) = self
            .deal_repo
            .find_active_for_contact(
                &mut *tx,
                contact.id,
                &contact.company_name,
                contact.phone.as_deref(),
            )
            .await?
        {
            return Err(AppError::ContactLocked(format!(
                "{} já está em atendimento por {}.",
                contact.company_name, existing.created_by_name
            )));
        }

        let deal = self
            .deal_repo
            .create(
                &mut *tx,
                &contact.company_name,
                contact.contact_name.as_deref(),
                contact.phone.as_deref(),
                contact.email.as_deref(),
                DealStatus::PotentialClient,
                Decimal::ZERO,
                contact.notes.as_deref(),
                Some(contact.id),
                user.id,
                &user.display_name,
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                "deal",
                deal.id,
                "started_from_contact",
                user.id,
                &user.display_name,
                &json!({ "contactId": contact.id, "companyName": contact.company_name }),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🔒 Contato '{}' travado pelo negócio {}",
            deal.business_name,
            deal.id
        );

        Ok(deal)
    }

    // =========================================================================
    //  IMPORTAÇÃO / EXPORTAÇÃO CSV
    // =========================================================================

    /// Importa contatos de um CSV (RFC 4180; vírgula dentro de aspas não
    /// quebra a linha). Continuação por registro: uma linha ruim conta
    /// como falha e a importação segue.
    pub async fn import_csv(&self, body: &str, user: &User) -> Result<ImportReport, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut report = ImportReport::default();

        for (index, row) in reader.deserialize::<CsvContactRow>().enumerate() {
            let line = index + 2; // linha 1 é o cabeçalho

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(format!("Linha {}: {}", line, e));
                    continue;
                }
            };

            if row.company_name.is_empty() {
                report.failed += 1;
                report
                    .errors
                    .push(format!("Linha {}: companyName é obrigatório", line));
                continue;
            }

            match self.contact_repo.company_exists(&row.company_name).await {
                Ok(true) => {
                    report.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(format!("Linha {}: {}", line, e));
                    continue;
                }
            }

            let created = self
                .contact_repo
                .create(
                    &row.company_name,
                    row.contact_name.as_deref(),
                    row.contact_position.as_deref(),
                    row.phone.as_deref(),
                    row.email.as_deref(),
                    row.category.as_deref(),
                    row.notes.as_deref(),
                    user.id,
                    &user.display_name,
                )
                .await;

            match created {
                Ok(_) => report.created += 1,
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(format!("Linha {}: {}", line, e));
                }
            }
        }

        tracing::info!(
            "📥 Importação de contatos: {} criados, {} pulados, {} com falha",
            report.created,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    pub async fn export_csv(&self) -> Result<String, AppError> {
        let contacts = self.contact_repo.list_all().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for contact in contacts {
            writer
                .serialize(CsvContactRow {
                    company_name: contact.company_name,
                    contact_name: contact.contact_name,
                    contact_position: contact.contact_position,
                    phone: contact.phone,
                    email: contact.email,
                    category: contact.category,
                    notes: contact.notes,
                })
                .map_err(|e| AppError::InvalidCsv(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::InvalidCsv(e.to_string()))?;

        String::from_utf8(bytes).map_err(|e| AppError::InternalServerError(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_with_quoted_comma_parses_whole_field() {
        let body = "companyName,contactName,contactPosition,phone,email,category,notes\n\
                    \"Mercado, Padaria e Cia\",João,,11999990000,,,\"obs, com vírgula\"\n";

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let rows: Vec<CsvContactRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("CSV válido");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_name, "Mercado, Padaria e Cia");
        assert_eq!(rows[0].notes.as_deref(), Some("obs, com vírgula"));
    }

    #[test]
    fn csv_header_roundtrip_keeps_camel_case() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .serialize(CsvContactRow {
                company_name: "Padaria Estrela do Sul".into(),
                contact_name: None,
                contact_position: None,
                phone: Some("11988880000".into()),
                email: None,
                category: None,
                notes: None,
            })
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("companyName,contactName"));
    }
}
