//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // A varredura de SLA roda de tempos em tempos no servidor; não depende
    // de alguém acionar a rota manual.
    spawn_sla_sweeper(app_state.clone());

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let contact_routes = Router::new()
        .route(
            "/",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
        .route("/import", post(handlers::contacts::import_contacts))
        .route("/export", get(handlers::contacts::export_contacts))
        .route(
            "/{id}",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        )
        .route(
            "/{id}/in-progress",
            get(handlers::contacts::contact_in_progress),
        )
        .route("/{id}/start-working", post(handlers::contacts::start_working))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let deal_routes = Router::new()
        .route(
            "/",
            post(handlers::deals::create_deal).get(handlers::deals::list_deals),
        )
        .route(
            "/{id}",
            get(handlers::deals::get_deal)
                .put(handlers::deals::update_deal)
                .delete(handlers::deals::delete_deal),
        )
        .route("/{id}/audit", get(handlers::deals::get_deal_audit))
        .route("/{id}/archive", post(handlers::deals::archive_deal))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let followup_routes = Router::new()
        .route(
            "/",
            post(handlers::followups::create_followup).get(handlers::followups::list_followups),
        )
        .route("/auto-run", post(handlers::followups::run_auto_followups))
        .route(
            "/{id}",
            axum::routing::put(handlers::followups::update_followup)
                .delete(handlers::followups::delete_followup),
        )
        .route("/{id}/complete", post(handlers::followups::complete_followup))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let visit_routes = Router::new()
        .route(
            "/",
            post(handlers::visits::create_visit).get(handlers::visits::list_visits),
        )
        .route("/{id}", axum::routing::delete(handlers::visits::delete_visit))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let quote_routes = Router::new()
        .route(
            "/",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/send", post(handlers::quotes::send_quote))
        .route("/{id}/accept", post(handlers::quotes::accept_quote))
        .route("/{id}/pdf", get(handlers::quotes::quote_pdf))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/read-all", post(handlers::notifications::mark_all_read))
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/sales-chart", get(handlers::dashboard::get_sales_chart))
        .route("/leaderboard", get(handlers::dashboard::get_leaderboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let analytics_routes = Router::new()
        .route("/health", get(handlers::dashboard::get_client_health))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/contacts", contact_routes)
        .nest("/api/deals", deal_routes)
        .nest("/api/followups", followup_routes)
        .nest("/api/visits", visit_routes)
        .nest("/api/quotes", quote_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/analytics", analytics_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

/// Dispara a varredura periódica de follow-ups automáticos.
/// O intervalo vem de SLA_SWEEP_INTERVAL_SECS (padrão: 1 hora).
fn spawn_sla_sweeper(app_state: AppState) {
    let interval_secs = std::env::var("SLA_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;

            match app_state.followup_service.sweep_all().await {
                Ok(report) => {
                    if report.created > 0 || report.failed > 0 {
                        tracing::info!(
                            "⏰ Varredura periódica de SLA: {} criados, {} pulados, {} com falha",
                            report.created,
                            report.skipped,
                            report.failed
                        );
                    }
                }
                Err(e) => tracing::error!("🔥 Varredura periódica de SLA falhou: {}", e),
            }
        }
    });
}
