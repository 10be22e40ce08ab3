pub mod user_repo;
pub use user_repo::UserRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
pub mod deal_repo;
pub use deal_repo::DealRepository;
pub mod followup_repo;
pub use followup_repo::FollowupRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
