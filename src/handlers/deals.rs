// src/handlers/deals.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::deals::{Deal, DealStatus},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    #[schema(example = "Padaria Estrela do Sul")]
    pub business_name: String,

    pub contact_person: Option<String>,
    pub phone_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[schema(example = "potential_client")]
    pub status: Option<DealStatus>,

    // Valor estimado; negativo é barrado no serviço
    #[serde(default)]
    #[schema(example = "15000.00")]
    pub price: Decimal,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealPayload {
    #[validate(length(min = 1, message = "O nome da empresa não pode ficar vazio."))]
    pub business_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone_number: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub status: Option<DealStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/deals
#[utoipa::path(
    post,
    path = "/api/deals",
    tag = "Deals",
    request_body = CreateDealPayload,
    responses(
        (status = 201, description = "Negócio criado", body = Deal)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deal = app_state
        .deal_service
        .create_deal(
            &payload.business_name,
            payload.contact_person.as_deref(),
            payload.phone_number.as_deref(),
            payload.email.as_deref(),
            payload.status,
            payload.price,
            payload.notes.as_deref(),
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(deal)))
}

// GET /api/deals
#[utoipa::path(
    get,
    path = "/api/deals",
    tag = "Deals",
    params(("includeArchived" = Option<bool>, Query, description = "Inclui arquivados")),
    responses(
        (status = 200, description = "Carteira visível ao usuário", body = Vec<Deal>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_deals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<DealListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let deals = app_state
        .deal_service
        .list_deals(&user, query.include_archived)
        .await?;

    Ok(Json(deals))
}

// GET /api/deals/{id}
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    tag = "Deals",
    responses(
        (status = 200, description = "Negócio", body = Deal),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_deal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deal = app_state.deal_service.get_deal(id, &user).await?;
    Ok(Json(deal))
}

// PUT /api/deals/{id}
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    tag = "Deals",
    request_body = UpdateDealPayload,
    responses(
        (status = 200, description = "Negócio atualizado", body = Deal)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_deal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDealPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deal = app_state
        .deal_service
        .update_deal(
            id,
            payload.business_name.as_deref(),
            payload.contact_person.as_deref(),
            payload.phone_number.as_deref(),
            payload.email.as_deref(),
            payload.price,
            payload.notes.as_deref(),
            payload.status,
            &user,
        )
        .await?;

    Ok(Json(deal))
}

// GET /api/deals/{id}/audit
#[utoipa::path(
    get,
    path = "/api/deals/{id}/audit",
    tag = "Deals",
    responses(
        (status = 200, description = "Trilha de auditoria do negócio", body = Vec<crate::models::audit::AuditLog>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_deal_audit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.deal_service.list_audit(id, &user).await?;
    Ok(Json(logs))
}

// POST /api/deals/{id}/archive
#[utoipa::path(
    post,
    path = "/api/deals/{id}/archive",
    tag = "Deals",
    responses(
        (status = 204, description = "Arquivado (sai do funil, solta a trava)")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_deal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.deal_service.archive_deal(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/deals/{id}
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    tag = "Deals",
    responses(
        (status = 204, description = "Excluído"),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_deal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.deal_service.delete_deal(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
