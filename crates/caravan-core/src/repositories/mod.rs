//! Repository traits (ports)
//!
//! Adapters are constructed over a single tenant's storage handle, so every
//! operation is implicitly tenant-scoped: an identifier from another tenant
//! can only ever come back `NotFound`.

pub mod booking_repository;
pub mod company_repository;
pub mod inquiry_repository;
pub mod user_repository;

pub use booking_repository::{BookingFilter, BookingRepository};
pub use company_repository::CompanyRepository;
pub use inquiry_repository::InquiryRepository;
pub use user_repository::UserRepository;
