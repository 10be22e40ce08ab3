// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::cache::TtlCache,
    db::{
        AuditRepository, ContactRepository, DashboardRepository, DealRepository,
        FollowupRepository, NotificationRepository, QuoteRepository, UserRepository,
        VisitRepository,
    },
    services::{
        AuthService, ContactService, DashboardService, DealService, DocumentService,
        FollowupService, HealthService, NotificationService, QuoteService, VisitService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    pub auth_service: AuthService,
    pub contact_service: ContactService,
    pub deal_service: DealService,
    pub followup_service: FollowupService,
    pub visit_service: VisitService,
    pub quote_service: QuoteService,
    pub document_service: DocumentService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
    pub health_service: HealthService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // Cache injetado, com TTL explícito
        let cache = TtlCache::new();

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let contact_repo = ContactRepository::new(db_pool.clone());
        let deal_repo = DealRepository::new(db_pool.clone());
        let followup_repo = FollowupRepository::new(db_pool.clone());
        let visit_repo = VisitRepository::new(db_pool.clone());
        let quote_repo = QuoteRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let notification_service = NotificationService::new(notification_repo);
        let contact_service = ContactService::new(
            contact_repo,
            deal_repo.clone(),
            audit_repo.clone(),
            db_pool.clone(),
        );
        let deal_service = DealService::new(
            deal_repo.clone(),
            audit_repo.clone(),
            notification_service.clone(),
            cache.clone(),
            db_pool.clone(),
        );
        let followup_service = FollowupService::new(
            deal_repo.clone(),
            followup_repo,
            notification_service.clone(),
            db_pool.clone(),
        );
        let visit_service = VisitService::new(visit_repo, deal_repo.clone());
        let quote_service = QuoteService::new(
            quote_repo.clone(),
            audit_repo,
            notification_service.clone(),
            db_pool.clone(),
        );
        let document_service = DocumentService::new(quote_repo);
        let dashboard_service = DashboardService::new(dashboard_repo, cache.clone());
        let health_service = HealthService::new(deal_repo, cache.clone());

        Ok(Self {
            db_pool,
            auth_service,
            contact_service,
            deal_service,
            followup_service,
            visit_service,
            quote_service,
            document_service,
            notification_service,
            dashboard_service,
            health_service,
        })
    }
}
