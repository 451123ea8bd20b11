//! Notification port and dispatcher
//!
//! State transitions emit events; the dispatcher hands them to the
//! transport off the critical path. A failed or slow send never reaches
//! the caller — the entity write has already committed and stays committed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error};

use caravan_shared::utils::mask_email;

use crate::error::DomainError;

/// Events emitted after successful state transitions.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    BookingConfirmation {
        customer_email: String,
        customer_name: String,
        package: String,
        total_amount: f64,
        departure_date: DateTime<Utc>,
        status: String,
    },
    InquiryReceived {
        name: String,
        email: String,
        phone: Option<String>,
        subject: String,
        message: String,
    },
    InquiryResponse {
        customer_email: String,
        customer_name: String,
        subject: String,
        response: String,
        responder_name: String,
    },
}

impl NotificationEvent {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::BookingConfirmation { .. } => "booking_confirmation",
            NotificationEvent::InquiryReceived { .. } => "inquiry_received",
            NotificationEvent::InquiryResponse { .. } => "inquiry_response",
        }
    }

    fn recipient(&self) -> String {
        match self {
            NotificationEvent::BookingConfirmation { customer_email, .. } => {
                mask_email(customer_email)
            }
            NotificationEvent::InquiryReceived { .. } => "back-office".to_string(),
            NotificationEvent::InquiryResponse { customer_email, .. } => {
                mask_email(customer_email)
            }
        }
    }
}

/// Transport port (SMTP in production, fakes in tests).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: NotificationEvent) -> Result<(), DomainError>;
}

/// Fire-and-forget dispatch: spawn the send, log the outcome, return
/// immediately. Failures are terminal here — no retry, no propagation.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn dispatch(&self, event: NotificationEvent) {
        let notifier = Arc::clone(&self.notifier);
        let kind = event.kind();
        let recipient = event.recipient();
        tokio::spawn(async move {
            match notifier.send(event).await {
                Ok(()) => debug!(kind, recipient, "notification sent"),
                Err(e) => error!(kind, recipient, error = %e, "notification dispatch failed"),
            }
        });
    }
}

/// Transport used when no mail configuration is present.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), DomainError> {
        debug!(kind = event.kind(), "mail transport disabled, dropping notification");
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    //! Recording/failing notifier fakes shared by service tests.

    use std::sync::Mutex;

    use super::*;

    /// Records every event; optionally fails each send.
    pub struct RecordingNotifier {
        pub fail: bool,
        pub sent: Mutex<Vec<&'static str>>,
    }

    impl RecordingNotifier {
        pub fn new(fail: bool) -> Self {
            Self {
                fail,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, event: NotificationEvent) -> Result<(), DomainError> {
            self.sent
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event.kind());
            if self.fail {
                Err(DomainError::Notification("smtp unreachable".into()))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::test_support::RecordingNotifier;
    use super::*;

    fn booking_event() -> NotificationEvent {
        NotificationEvent::BookingConfirmation {
            customer_email: "customer@example.com".into(),
            customer_name: "Customer".into(),
            package: "Umrah".into(),
            total_amount: 1200.0,
            departure_date: Utc::now(),
            status: "pending".into(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_swallows_transport_failure() {
        let notifier = Arc::new(RecordingNotifier::new(true));
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        // Must not panic or surface the error.
        dispatcher.dispatch(booking_event());
        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent.lock().unwrap().as_slice(),
            ["booking_confirmation"]
        );
    }

    #[tokio::test]
    async fn test_dispatch_returns_before_send_completes() {
        let notifier = Arc::new(RecordingNotifier::new(false));
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        dispatcher.dispatch(booking_event());
        // dispatch() itself is synchronous; the send happens on a task.
        tokio::task::yield_now().await;
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }
}
