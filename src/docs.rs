// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Contacts ---
        handlers::contacts::create_contact,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,
        handlers::contacts::contact_in_progress,
        handlers::contacts::start_working,
        handlers::contacts::import_contacts,
        handlers::contacts::export_contacts,

        // --- Deals ---
        handlers::deals::create_deal,
        handlers::deals::list_deals,
        handlers::deals::get_deal,
        handlers::deals::update_deal,
        handlers::deals::get_deal_audit,
        handlers::deals::archive_deal,
        handlers::deals::delete_deal,

        // --- Followups ---
        handlers::followups::create_followup,
        handlers::followups::list_followups,
        handlers::followups::update_followup,
        handlers::followups::complete_followup,
        handlers::followups::delete_followup,
        handlers::followups::run_auto_followups,

        // --- Visits ---
        handlers::visits::create_visit,
        handlers::visits::list_visits,
        handlers::visits::delete_visit,

        // --- Quotes ---
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::send_quote,
        handlers::quotes::accept_quote,
        handlers::quotes::quote_pdf,
        handlers::quotes::delete_quote,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_sales_chart,
        handlers::dashboard::get_leaderboard,
        handlers::dashboard::get_client_health,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Contacts ---
            models::contacts::Contact,
            models::contacts::ContactLockStatus,
            models::contacts::ImportReport,
            handlers::contacts::CreateContactPayload,
            handlers::contacts::UpdateContactPayload,

            // --- Deals ---
            models::deals::DealStatus,
            models::deals::Deal,
            models::audit::AuditLog,
            handlers::deals::CreateDealPayload,
            handlers::deals::UpdateDealPayload,

            // --- Followups ---
            models::followups::FollowupStatus,
            models::followups::FollowupSource,
            models::followups::Followup,
            models::followups::AutoFollowupReport,
            handlers::followups::CreateFollowupPayload,
            handlers::followups::UpdateFollowupPayload,

            // --- Visits ---
            models::visits::Visit,
            handlers::visits::CreateVisitPayload,

            // --- Quotes ---
            models::quotes::QuoteStatus,
            models::quotes::QuoteItem,
            models::quotes::QuoteTotals,
            models::quotes::Quote,
            handlers::quotes::CreateQuotePayload,
            handlers::quotes::UpdateQuotePayload,

            // --- Notifications ---
            models::notifications::NotificationKind,
            models::notifications::NotificationPriority,
            models::notifications::Notification,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::SalesChartEntry,
            models::dashboard::LeaderboardEntry,
            models::dashboard::HealthStatus,
            models::dashboard::ClientHealth,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Contacts", description = "Prospecção e Trava de Contatos"),
        (name = "Deals", description = "Funil de Negócios"),
        (name = "Followups", description = "Lembretes e SLA de Etapa"),
        (name = "Visits", description = "Visitas Comerciais"),
        (name = "Quotes", description = "Orçamentos e PDF"),
        (name = "Notifications", description = "Notificações do Usuário"),
        (name = "Dashboard", description = "Indicadores, Ranking e Saúde de Clientes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
