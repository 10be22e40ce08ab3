pub mod auth;
pub use auth::AuthService;
pub mod contact_service;
pub use contact_service::ContactService;
pub mod deal_service;
pub use deal_service::DealService;
pub mod followup_service;
pub use followup_service::FollowupService;
pub mod health_service;
pub use health_service::HealthService;
pub mod quote_service;
pub use quote_service::QuoteService;
pub mod document_service;
pub use document_service::DocumentService;
pub mod notification_service;
pub use notification_service::NotificationService;
pub mod visit_service;
pub use visit_service::VisitService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
