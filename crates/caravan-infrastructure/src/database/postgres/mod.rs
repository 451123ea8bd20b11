//! PostgreSQL repository adapters

pub mod booking_repo_impl;
pub mod company_repo_impl;
pub mod inquiry_repo_impl;
pub mod user_repo_impl;

pub use booking_repo_impl::PgBookingRepository;
pub use company_repo_impl::PgCompanyRepository;
pub use inquiry_repo_impl::PgInquiryRepository;
pub use user_repo_impl::PgUserRepository;

use caravan_core::domain::Oid;
use caravan_core::error::DomainError;

/// Ids come back from CHAR(24) columns; reject anything that does not
/// parse instead of letting a corrupt row masquerade as an entity.
fn parse_oid(raw: &str) -> Result<Oid, DomainError> {
    Oid::parse(raw).map_err(|_| DomainError::Database(format!("malformed id in row: {raw:?}")))
}
