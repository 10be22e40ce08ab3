// src/handlers/followups.rs

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
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::followups::{AutoFollowupReport, Followup, FollowupStatus},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowupPayload {
    pub deal_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-08-20")]
    pub reminder_date: NaiveDate,

    #[validate(length(min = 1, message = "A próxima ação não pode ficar vazia."))]
    pub next_action: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFollowupPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub reminder_date: Option<NaiveDate>,
    pub next_action: Option<String>,
    pub notes: Option<String>,
    pub status: Option<FollowupStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupListQuery {
    pub deal_id: Option<Uuid>,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/followups
#[utoipa::path(
    post,
    path = "/api/followups",
    tag = "Followups",
    request_body = CreateFollowupPayload,
    responses(
        (status = 201, description = "Follow-up manual criado", body = Followup)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_followup(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateFollowupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let followup = app_state
        .followup_service
        .create_manual(
            payload.deal_id,
            payload.reminder_date,
            payload.next_action.as_deref(),
            payload.notes.as_deref(),
            &user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(followup)))
}

// GET /api/followups  (meus, ou de um negócio via ?dealId=)
#[utoipa::path(
    get,
    path = "/api/followups",
    tag = "Followups",
    params(("dealId" = Option<Uuid>, Query, description = "Filtra pelos follow-ups de um negócio")),
    responses(
        (status = 200, description = "Follow-ups com status derivado (overdue calculado na leitura)", body = Vec<Followup>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_followups(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<FollowupListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let followups = match query.deal_id {
        Some(deal_id) => app_state.followup_service.list_for_deal(deal_id).await?,
        None => app_state.followup_service.list_mine(user.id).await?,
    };

    Ok(Json(followups))
}

// PUT /api/followups/{id}
#[utoipa::path(
    put,
    path = "/api/followups/{id}",
    tag = "Followups",
    request_body = UpdateFollowupPayload,
    responses(
        (status = 200, description = "Follow-up atualizado", body = Followup)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_followup(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFollowupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let followup = app_state
        .followup_service
        .update(
            id,
            payload.reminder_date,
            payload.next_action.as_deref(),
            payload.notes.as_deref(),
            payload.status,
            &user,
        )
        .await?;

    Ok(Json(followup))
}

// POST /api/followups/{id}/complete
#[utoipa::path(
    post,
    path = "/api/followups/{id}/complete",
    tag = "Followups",
    responses(
        (status = 200, description = "Concluído (status=done, completed_at=agora)", body = Followup)
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_followup(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let followup = app_state.followup_service.complete(id, &user).await?;
    Ok(Json(followup))
}

// DELETE /api/followups/{id}
#[utoipa::path(
    delete,
    path = "/api/followups/{id}",
    tag = "Followups",
    responses((status = 204, description = "Excluído")),
    security(("api_jwt" = []))
)]
pub async fn delete_followup(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.followup_service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/followups/auto-run
// A varredura sob demanda; a tarefa de fundo cobre quem nunca aciona a rota.
#[utoipa::path(
    post,
    path = "/api/followups/auto-run",
    tag = "Followups",
    responses(
        (status = 200, description = "Relatório da varredura de SLA", body = AutoFollowupReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn run_auto_followups(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .followup_service
        .run_auto_followups(user.id, &user.display_name)
        .await?;

    Ok(Json(report))
}
