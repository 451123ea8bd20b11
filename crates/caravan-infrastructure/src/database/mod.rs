//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;
pub mod registry;
pub mod schema;

pub use connection::create_pool;
pub use postgres::{
    PgBookingRepository, PgCompanyRepository, PgInquiryRepository, PgUserRepository,
};
pub use registry::{ConnectionFactory, PgConnectionFactory, TenantRegistry, TenantStores};
