//! # Caravan Shared
//!
//! Shared utilities, types, configuration, and telemetry for the caravan
//! back office.

pub mod config;
pub mod constants;
pub mod telemetry;
pub mod utils;
