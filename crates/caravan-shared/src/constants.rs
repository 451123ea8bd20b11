//! Application-wide constants

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of a canonical entity/company identifier (24 lowercase hex chars).
pub const CANONICAL_ID_LENGTH: usize = 24;

/// Header carrying the tenant identifier on incoming requests.
pub const COMPANY_ID_HEADER: &str = "x-company-id";
/// Query parameter fallback for the tenant identifier.
pub const COMPANY_ID_QUERY: &str = "companyId";

/// Ceiling for a single outbound notification send.
pub const NOTIFICATION_SEND_TIMEOUT_SECS: u64 = 20;

/// Database name prefix for per-company databases.
pub const TENANT_DB_PREFIX: &str = "company_";
