//! # Caravan Security
//!
//! Security utilities: password hashing and JWT access tokens.

pub mod jwt;
pub mod password;

pub use jwt::{AccessClaims, JwtService};
pub use password::PasswordService;
