//! SMTP notification transport
//!
//! Renders notification events into handlebars templates and sends them
//! through a pooled SMTP connection. Sends are bounded by a hard timeout so
//! a hung relay cannot pin background tasks forever.

use std::time::Duration;

use async_trait::async_trait;
use handlebars::Handlebars;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use tracing::debug;

use caravan_core::error::DomainError;
use caravan_core::notification::{NotificationEvent, Notifier};
use caravan_shared::config::SmtpSettings;
use caravan_shared::constants::NOTIFICATION_SEND_TIMEOUT_SECS;

const BOOKING_CONFIRMATION_HTML: &str = r#"
<h2>Booking received</h2>
<p>Dear {{customer_name}},</p>
<p>Thank you for booking <strong>{{package}}</strong> with us.</p>
<ul>
  <li>Departure: {{departure_date}}</li>
  <li>Total amount: {{total_amount}}</li>
  <li>Status: {{status}}</li>
</ul>
<p>We will be in touch as your booking progresses.</p>
"#;

const INQUIRY_RECEIVED_HTML: &str = r#"
<h2>New inquiry</h2>
<p><strong>{{name}}</strong> ({{email}}{{#if phone}}, {{phone}}{{/if}}) wrote:</p>
<p><strong>{{subject}}</strong></p>
<blockquote>{{message}}</blockquote>
"#;

const INQUIRY_RESPONSE_HTML: &str = r#"
<p>Dear {{customer_name}},</p>
<p>{{responder_name}} replied to your inquiry <strong>{{subject}}</strong>:</p>
<blockquote>{{response}}</blockquote>
"#;

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Handlebars<'static>,
    sender: String,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DomainError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| DomainError::Notification(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        let mut templates = Handlebars::new();
        for (name, template) in [
            ("booking_confirmation", BOOKING_CONFIRMATION_HTML),
            ("inquiry_received", INQUIRY_RECEIVED_HTML),
            ("inquiry_response", INQUIRY_RESPONSE_HTML),
        ] {
            templates
                .register_template_string(name, template)
                .map_err(|e| DomainError::Notification(e.to_string()))?;
        }

        Ok(Self {
            transport,
            templates,
            sender: settings.sender.clone(),
        })
    }

    fn render(&self, event: &NotificationEvent) -> Result<(String, String, String), DomainError> {
        let (to, subject, context) = match event {
            NotificationEvent::BookingConfirmation {
                customer_email,
                customer_name,
                package,
                total_amount,
                departure_date,
                status,
            } => (
                customer_email.clone(),
                format!("Booking received: {package}"),
                json!({
                    "customer_name": customer_name,
                    "package": package,
                    "total_amount": format!("{total_amount:.2}"),
                    "departure_date": departure_date.format("%d %b %Y").to_string(),
                    "status": status,
                }),
            ),
            // Inquiry notifications go to the back office, i.e. the sender
            // address itself.
            NotificationEvent::InquiryReceived {
                name,
                email,
                phone,
                subject,
                message,
            } => (
                self.sender.clone(),
                format!("New inquiry: {subject}"),
                json!({
                    "name": name,
                    "email": email,
                    "phone": phone,
                    "subject": subject,
                    "message": message,
                }),
            ),
            NotificationEvent::InquiryResponse {
                customer_email,
                customer_name,
                subject,
                response,
                responder_name,
            } => (
                customer_email.clone(),
                format!("Re: {subject}"),
                json!({
                    "customer_name": customer_name,
                    "subject": subject,
                    "response": response,
                    "responder_name": responder_name,
                }),
            ),
        };
        let body = self
            .templates
            .render(event.kind(), &context)
            .map_err(|e| DomainError::Notification(e.to_string()))?;
        Ok((to, subject, body))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), DomainError> {
        let (to, subject, body) = self.render(&event)?;
        let message = Message::builder()
            .from(
                self.sender
                    .parse()
                    .map_err(|_| DomainError::Notification("invalid sender address".into()))?,
            )
            .to(to
                .parse()
                .map_err(|_| DomainError::Notification(format!("invalid recipient: {to}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| DomainError::Notification(e.to_string()))?;

        let send = self.transport.send(message);
        match tokio::time::timeout(Duration::from_secs(NOTIFICATION_SEND_TIMEOUT_SECS), send).await
        {
            Ok(Ok(_)) => {
                debug!(kind = event.kind(), "smtp send complete");
                Ok(())
            }
            Ok(Err(e)) => Err(DomainError::Notification(e.to_string())),
            Err(_) => Err(DomainError::Notification("smtp send timed out".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_shared::config::SmtpSettings;
    use chrono::Utc;

    fn notifier() -> SmtpNotifier {
        SmtpNotifier::new(&SmtpSettings {
            enabled: true,
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            password: "secret".into(),
            sender: "office@example.com".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_booking_confirmation_renders() {
        let (to, subject, body) = notifier()
            .render(&NotificationEvent::BookingConfirmation {
                customer_email: "hassan@example.com".into(),
                customer_name: "Hassan".into(),
                package: "Umrah Standard".into(),
                total_amount: 3000.0,
                departure_date: Utc::now(),
                status: "pending".into(),
            })
            .unwrap();
        assert_eq!(to, "hassan@example.com");
        assert!(subject.contains("Umrah Standard"));
        assert!(body.contains("Hassan"));
        assert!(body.contains("3000.00"));
    }

    #[test]
    fn test_inquiry_received_goes_to_back_office() {
        let (to, _, body) = notifier()
            .render(&NotificationEvent::InquiryReceived {
                name: "Fatima".into(),
                email: "fatima@example.com".into(),
                phone: None,
                subject: "Visa".into(),
                message: "How long?".into(),
            })
            .unwrap();
        assert_eq!(to, "office@example.com");
        assert!(body.contains("fatima@example.com"));
    }
}
