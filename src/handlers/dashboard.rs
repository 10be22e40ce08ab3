// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{ClientHealth, DashboardSummary, LeaderboardEntry, SalesChartEntry},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do painel (60s de cache)", body = DashboardSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary(&user).await?;
    Ok(Json(summary))
}

// GET /api/dashboard/sales-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/sales-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Receita fechada por dia, últimos 30 dias", body = Vec<SalesChartEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sales_chart(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let chart = app_state.dashboard_service.get_sales_chart(&user).await?;
    Ok(Json(chart))
}

// GET /api/dashboard/leaderboard
#[utoipa::path(
    get,
    path = "/api/dashboard/leaderboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Ranking de vendedores com comissão", body = Vec<LeaderboardEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_leaderboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let leaderboard = app_state.dashboard_service.get_leaderboard().await?;
    Ok(Json(leaderboard))
}

// GET /api/analytics/health
#[utoipa::path(
    get,
    path = "/api/analytics/health",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Saúde 0-100 por cliente, piores primeiro", body = Vec<ClientHealth>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client_health(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let health = app_state.health_service.client_health(&user).await?;
    Ok(Json(health))
}
