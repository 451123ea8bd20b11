//! Email notification transport

pub mod smtp;

pub use smtp::SmtpNotifier;
