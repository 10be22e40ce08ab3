// src/handlers/visits.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::visits::Visit,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitPayload {
    pub deal_id: Uuid,

    pub address: Option<String>,

    #[schema(value_type = String, format = Date, example = "2025-08-15")]
    pub visit_date: NaiveDate,

    #[schema(example = "Apresentação da proposta")]
    pub purpose: Option<String>,
    pub result: Option<String>,
    pub next_step: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitListQuery {
    pub deal_id: Option<Uuid>,
}

// POST /api/visits
#[utoipa::path(
    post,
    path = "/api/visits",
    tag = "Visits",
    request_body = CreateVisitPayload,
    responses(
        (status = 201, description = "Visita registrada", body = Visit)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state
        .visit_service
        .register_visit(
            payload.deal_id,
            payload.address.as_deref(),
            payload.visit_date,
            payload.purpose.as_deref(),
            payload.result.as_deref(),
            payload.next_step.as_deref(),
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(visit)))
}

// GET /api/visits  (minhas, ou de um negócio via ?dealId=)
#[utoipa::path(
    get,
    path = "/api/visits",
    tag = "Visits",
    params(("dealId" = Option<Uuid>, Query, description = "Filtra pelas visitas de um negócio")),
    responses(
        (status = 200, description = "Lista de visitas", body = Vec<Visit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<VisitListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let visits = match query.deal_id {
        Some(deal_id) => app_state.visit_service.list_for_deal(deal_id).await?,
        None => app_state.visit_service.list_mine(&user).await?,
    };

    Ok(Json(visits))
}

// DELETE /api/visits/{id}
#[utoipa::path(
    delete,
    path = "/api/visits/{id}",
    tag = "Visits",
    responses(
        (status = 204, description = "Excluída"),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.visit_service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
