//! Domain services (business logic)

pub mod auth_service;
pub mod booking_service;
pub mod company_service;
pub mod inquiry_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginResult};
pub use booking_service::{BookingChanges, BookingService};
pub use company_service::{CompanyService, CreatedCompany, NewCompany, TenantProvisioner};
pub use inquiry_service::{InquiryChanges, InquiryService, NewInquiry};
pub use user_service::{UserChanges, UserService};
