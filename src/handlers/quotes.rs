// src/handlers/quotes.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::quotes::{Quote, QuoteItem},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotePayload {
    pub deal_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Padaria Estrela do Sul")]
    pub client_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    #[schema(example = "Implantação do sistema de pedidos")]
    pub title: String,

    #[serde(default)]
    pub items: Vec<QuoteItem>,

    // Percentuais em [0, 100]; o serviço valida os limites
    #[serde(default)]
    #[schema(example = "10.00")]
    pub discount: Decimal,
    #[serde(default)]
    #[schema(example = "5.00")]
    pub tax: Decimal,

    pub terms: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-09-30")]
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotePayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    pub client_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[serde(default)]
    pub items: Vec<QuoteItem>,

    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax: Decimal,

    pub terms: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = CreateQuotePayload,
    responses(
        (status = 201, description = "Orçamento criado com totais calculados no servidor", body = Quote)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quote = app_state
        .quote_service
        .create_quote(
            payload.deal_id,
            &payload.client_name,
            payload.client_email.as_deref(),
            payload.client_phone.as_deref(),
            &payload.title,
            payload.items,
            payload.discount,
            payload.tax,
            payload.terms.as_deref(),
            payload.valid_until,
            payload.notes.as_deref(),
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    responses(
        (status = 200, description = "Orçamentos visíveis ao usuário", body = Vec<Quote>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let quotes = app_state.quote_service.list_quotes(&user).await?;
    Ok(Json(quotes))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    responses(
        (status = 200, description = "Orçamento", body = Quote),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service.get_quote(id).await?;
    Ok(Json(quote))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    request_body = UpdateQuotePayload,
    responses(
        (status = 200, description = "Orçamento atualizado e recalculado", body = Quote),
        (status = 409, description = "Orçamento aceito é imutável")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quote = app_state
        .quote_service
        .update_quote(
            id,
            &payload.client_name,
            payload.client_email.as_deref(),
            payload.client_phone.as_deref(),
            &payload.title,
            payload.items,
            payload.discount,
            payload.tax,
            payload.terms.as_deref(),
            payload.valid_until,
            payload.notes.as_deref(),
        )
        .await?;

    Ok(Json(quote))
}

// POST /api/quotes/{id}/send
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/send",
    tag = "Quotes",
    responses(
        (status = 200, description = "Marcado como enviado", body = Quote),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service.send_quote(id, &user).await?;
    Ok(Json(quote))
}

// POST /api/quotes/{id}/accept
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/accept",
    tag = "Quotes",
    responses(
        (status = 200, description = "Aceito; criador é notificado", body = Quote),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service.accept_quote(id, &user).await?;
    Ok(Json(quote))
}

// GET /api/quotes/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/pdf",
    tag = "Quotes",
    responses(
        (status = 200, description = "PDF do orçamento", content_type = "application/pdf")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.document_service.generate_quote_pdf(id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"orcamento-{}.pdf\"", id),
            ),
        ],
        pdf,
    ))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    responses(
        (status = 204, description = "Excluído"),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.quote_service.delete_quote(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
