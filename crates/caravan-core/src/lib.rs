//! # Caravan Core
//!
//! Domain entities, the approval state machine, the authorization gate,
//! repository traits, and the domain services for the caravan travel-booking
//! back office.

pub mod authz;
pub mod domain;
pub mod error;
pub mod notification;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
