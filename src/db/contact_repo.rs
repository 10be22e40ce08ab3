// src/db/contact_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::contacts::Contact};

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_name: &str,
        contact_name: Option<&str>,
        contact_position: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        category: Option<&str>,
        notes: Option<&str>,
        created_by: Uuid,
        created_by_name: &str,
    ) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (
                company_name, contact_name, contact_position, phone, email,
                category, notes, created_by, created_by_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(company_name)
        .bind(contact_name)
        .bind(contact_position)
        .bind(phone)
        .bind(email)
        .bind(category)
        .bind(notes)
        .bind(created_by)
        .bind(created_by_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // O índice único em lower(company_name) é quem barra a duplicata
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A empresa '{}' já está cadastrada.",
                        company_name
                    ));
                }
            }
            e.into()
        })?;

        Ok(contact)
    }

    /// Busca por empresa, nome do contato ou telefone.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Contact>, AppError> {
        let contacts = match search {
            Some(q) => {
                let term = format!("%{}%", q);
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT * FROM contacts
                    WHERE company_name ILIKE $1
                       OR contact_name ILIKE $1
                       OR phone ILIKE $1
                    ORDER BY company_name ASC
                    LIMIT 200
                    "#,
                )
                .bind(term)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Contact>(
                    "SELECT * FROM contacts ORDER BY company_name ASC LIMIT 200",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(contacts)
    }

    /// Lista completa, sem paginação, para a exportação CSV.
    pub async fn list_all(&self) -> Result<Vec<Contact>, AppError> {
        let contacts =
            sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY company_name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(contacts)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(contact)
    }

    /// Checagem case-insensitive usada na importação de CSV.
    pub async fn company_exists(&self, company_name: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM contacts WHERE lower(company_name) = lower($1))",
        )
        .bind(company_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Update de todos os campos editáveis. A proteção de phone/email de
    /// contato travado é decidida no serviço, que passa aqui os valores finais.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        company_name: &str,
        contact_name: Option<&str>,
        contact_position: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        category: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET
                company_name = $2,
                contact_name = $3,
                contact_position = $4,
                phone = $5,
                email = $6,
                category = $7,
                notes = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_name)
        .bind(contact_name)
        .bind(contact_position)
        .bind(phone)
        .bind(email)
        .bind(category)
        .bind(notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A empresa '{}' já está cadastrada.",
                        company_name
                    ));
                }
            }
            e.into()
        })?
        .ok_or(AppError::NotFound("Contato"))?;

        Ok(contact)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
