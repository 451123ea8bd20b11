//! # Caravan Infrastructure
//!
//! PostgreSQL adapters, the per-tenant connection registry, and the SMTP
//! notification transport.

pub mod database;
pub mod email;

pub use database::{
    create_pool, ConnectionFactory, PgBookingRepository, PgCompanyRepository,
    PgConnectionFactory, PgInquiryRepository, PgUserRepository, TenantRegistry, TenantStores,
};
pub use email::SmtpNotifier;
