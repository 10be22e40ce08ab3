// src/handlers/contacts.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::contacts::{Contact, ContactLockStatus, ImportReport},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    #[schema(example = "Padaria Estrela do Sul")]
    pub company_name: String,

    #[schema(example = "João Pereira")]
    pub contact_name: Option<String>,
    pub contact_position: Option<String>,

    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    #[validate(length(min = 1, message = "O nome da empresa não pode ficar vazio."))]
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_position: Option<String>,
    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub search: Option<String>,
}

// =============================================================================
//  CRUD
// =============================================================================

// POST /api/contacts
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = Contact),
        (status = 409, description = "Empresa já cadastrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = app_state
        .contact_service
        .create_contact(
            &payload.company_name,
            payload.contact_name.as_deref(),
            payload.contact_position.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
            payload.category.as_deref(),
            payload.notes.as_deref(),
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// GET /api/contacts
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    params(("search" = Option<String>, Query, description = "Busca por empresa, contato ou telefone")),
    responses(
        (status = 200, description = "Lista de contatos", body = Vec<Contact>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contacts = app_state
        .contact_service
        .list_contacts(query.search.as_deref())
        .await?;

    Ok(Json(contacts))
}

// GET /api/contacts/{id}
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    responses(
        (status = 200, description = "Contato", body = Contact),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state.contact_service.get_contact(id).await?;
    Ok(Json(contact))
}

// PUT /api/contacts/{id}
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    request_body = UpdateContactPayload,
    responses(
        (status = 200, description = "Contato atualizado (phone/email preservados se travado)", body = Contact)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = app_state
        .contact_service
        .update_contact(
            id,
            payload.company_name.as_deref(),
            payload.contact_name.as_deref(),
            payload.contact_position.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
            payload.category.as_deref(),
            payload.notes.as_deref(),
        )
        .await?;

    Ok(Json(contact))
}

// DELETE /api/contacts/{id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    responses(
        (status = 204, description = "Excluído"),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_contact(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  TRAVA DE CONTATO
// =============================================================================

// GET /api/contacts/{id}/in-progress
#[utoipa::path(
    get,
    path = "/api/contacts/{id}/in-progress",
    tag = "Contacts",
    responses(
        (status = 200, description = "Estado da trava", body = ContactLockStatus)
    ),
    security(("api_jwt" = []))
)]
pub async fn contact_in_progress(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.contact_service.lock_status(id).await?;
    Ok(Json(status))
}

// POST /api/contacts/{id}/start-working
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/start-working",
    tag = "Contacts",
    responses(
        (status = 201, description = "Negócio criado a partir do contato", body = crate::models::deals::Deal),
        (status = 409, description = "Contato já em atendimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_working(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state
        .contact_service
        .start_working_on_contact(id, &user)
        .await?;

    Ok((StatusCode::CREATED, Json(deal)))
}

// =============================================================================
//  IMPORTAÇÃO / EXPORTAÇÃO
// =============================================================================

// POST /api/contacts/import  (corpo = texto CSV)
#[utoipa::path(
    post,
    path = "/api/contacts/import",
    tag = "Contacts",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Relatório da importação", body = ImportReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn import_contacts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.contact_service.import_csv(&body, &user).await?;
    Ok(Json(report))
}

// GET /api/contacts/export
#[utoipa::path(
    get,
    path = "/api/contacts/export",
    tag = "Contacts",
    responses(
        (status = 200, description = "CSV de todos os contatos", content_type = "text/csv")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_contacts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let csv_body = app_state.contact_service.export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"contacts.csv\"",
            ),
        ],
        csv_body,
    ))
}
