//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Company not found")]
    TenantNotFound,

    /// Transient storage connection failure; safe to retry, never cached.
    #[error("Storage connection failed: {0}")]
    Connection(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not authorized")]
    Forbidden,

    #[error("Validation failed: {}", details.join("; "))]
    Validation { details: Vec<String> },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Illegal transition: cannot {action} while {from}")]
    IllegalTransition {
        from: &'static str,
        action: &'static str,
    },

    /// Always non-fatal; caught and logged at the dispatch boundary.
    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn validation(detail: impl Into<String>) -> Self {
        DomainError::Validation {
            details: vec![detail.into()],
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Connection(_))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        details.sort();
        DomainError::Validation { details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DomainError::Connection("refused".into()).is_retryable());
        assert!(!DomainError::TenantNotFound.is_retryable());
        assert!(!DomainError::Forbidden.is_retryable());
    }

    #[test]
    fn test_validation_message_carries_details() {
        let err = DomainError::Validation {
            details: vec!["returnDate: must be after departureDate".into()],
        };
        assert!(err.to_string().contains("returnDate"));
    }
}
