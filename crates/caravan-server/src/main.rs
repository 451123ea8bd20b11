//! Caravan server binary
//!
//! Wires configuration, the platform database, the tenant registry, and the
//! notification transport into the HTTP router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use caravan_api::{build_router, AppState};
use caravan_core::domain::{Role, User};
use caravan_core::notification::{NoopNotifier, NotificationDispatcher, Notifier};
use caravan_core::repositories::{CompanyRepository, UserRepository};
use caravan_core::services::CompanyService;
use caravan_infrastructure::database::schema::bootstrap_platform;
use caravan_infrastructure::{
    create_pool, PgCompanyRepository, PgConnectionFactory, PgUserRepository, SmtpNotifier,
    TenantRegistry,
};
use caravan_security::{JwtService, PasswordService};
use caravan_shared::config::AppConfig;
use caravan_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry();

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(app = %config.app.name, env = %config.app.env, "configuration loaded");

    // Platform database: companies and super admins.
    let platform_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to the platform database")?;
    bootstrap_platform(&platform_pool)
        .await
        .context("failed to bootstrap the platform schema")?;
    info!("platform database ready");

    let companies: Arc<dyn CompanyRepository> =
        Arc::new(PgCompanyRepository::new(platform_pool.clone()));
    let platform_users: Arc<dyn UserRepository> =
        Arc::new(PgUserRepository::new(platform_pool.clone()));

    seed_super_admin(&config, platform_users.as_ref()).await?;

    let factory = Arc::new(PgConnectionFactory::new(config.database.max_connections));
    let registry = Arc::new(TenantRegistry::new(companies.clone(), factory.clone()));

    let notifier: Arc<dyn Notifier> = if config.smtp.enabled {
        info!(host = %config.smtp.host, "smtp transport enabled");
        Arc::new(SmtpNotifier::new(&config.smtp).context("failed to build smtp transport")?)
    } else {
        warn!("smtp disabled, notifications will be dropped");
        Arc::new(NoopNotifier)
    };
    let dispatcher = NotificationDispatcher::new(notifier);

    let jwt = Arc::new(JwtService::new(
        config.jwt.secret.clone(),
        config.jwt.access_token_expiry,
    ));
    let company_service = Arc::new(CompanyService::new(
        companies.clone(),
        factory,
        &config.database.url,
    ));

    let state = AppState {
        registry,
        companies,
        platform_users,
        company_service,
        jwt,
        dispatcher,
        config: config.clone(),
    };

    let addr = SocketAddr::new(
        config.app.host.parse().context("invalid app.host")?,
        config.app.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// First-run seeding of the platform super admin, when configured. Existing
/// accounts are left untouched.
async fn seed_super_admin(config: &AppConfig, users: &dyn UserRepository) -> Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap.super_admin_email.as_deref(),
        config.bootstrap.super_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if users.find_by_email(email).await?.is_some() {
        return Ok(());
    }

    let hash = PasswordService::hash(password).context("failed to hash bootstrap password")?;
    let admin = User::new(
        "Platform Admin".to_string(),
        email.to_string(),
        hash,
        Role::SuperAdmin,
        None,
    )?;
    users.create(&admin).await?;
    info!("platform super admin seeded");
    Ok(())
}
