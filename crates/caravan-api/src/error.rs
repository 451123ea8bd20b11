//! HTTP mapping for domain errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use caravan_core::error::DomainError;

use crate::response::ApiResponse;

/// Wrapper giving `DomainError` an HTTP representation.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self.0 {
            DomainError::TenantNotFound => {
                tracing::warn!("Tenant not found");
                (StatusCode::BAD_REQUEST, "TENANT_NOT_FOUND", None)
            }
            DomainError::Connection(msg) => {
                tracing::error!("Tenant connection failed: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "CONNECTION_FAILED", None)
            }
            DomainError::Unauthenticated => {
                tracing::warn!("Unauthenticated request");
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", None)
            }
            DomainError::Forbidden => {
                tracing::warn!("Forbidden request");
                (StatusCode::FORBIDDEN, "FORBIDDEN", None)
            }
            DomainError::Validation { details } => {
                tracing::warn!("Validation failed: {}", details.join("; "));
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    Some(details.clone()),
                )
            }
            DomainError::NotFound(resource) => {
                tracing::warn!("{} not found", resource);
                (StatusCode::NOT_FOUND, "NOT_FOUND", None)
            }
            DomainError::IllegalTransition { from, action } => {
                tracing::warn!("Illegal transition: cannot {} while {}", action, from);
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION", None)
            }
            DomainError::Notification(msg) => {
                // Reaching the HTTP layer means a synchronous send; treated
                // as an internal fault.
                tracing::error!("Notification failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
            DomainError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        };

        // Internal detail stays in the logs; clients get the generic text.
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            _ => self.0.to_string(),
        };
        let body = Json(ApiResponse::<()>::error(code, &message, details));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(DomainError::TenantNotFound), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::Connection("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(DomainError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(DomainError::validation("x: bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::NotFound("booking")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::IllegalTransition {
                from: "confirmed",
                action: "approve"
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Database("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
