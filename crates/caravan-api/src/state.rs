use std::sync::Arc;

use caravan_core::notification::NotificationDispatcher;
use caravan_core::repositories::{CompanyRepository, UserRepository};
use caravan_core::services::CompanyService;
use caravan_infrastructure::TenantRegistry;
use caravan_security::JwtService;
use caravan_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Resolves company ids to tenant stores.
    pub registry: Arc<TenantRegistry>,
    /// Platform-scope stores (companies, super admins).
    pub companies: Arc<dyn CompanyRepository>,
    pub platform_users: Arc<dyn UserRepository>,
    pub company_service: Arc<CompanyService>,
    pub jwt: Arc<JwtService>,
    pub dispatcher: NotificationDispatcher,
    pub config: AppConfig,
}
