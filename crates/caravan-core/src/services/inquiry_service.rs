//! Inquiry service
//!
//! Inquiries arrive through a public form, so `create` takes no principal.
//! Everything after intake is gated: agents see their assigned inquiries,
//! admins see and ratify everything.

use std::sync::Arc;

use tracing::info;

use crate::authz::{require_admin, require_assignee_or_admin, Principal};
use crate::domain::{Inquiry, InquiryResponse, InquiryStatus, Oid, Priority};
use crate::error::DomainError;
use crate::notification::{NotificationDispatcher, NotificationEvent};
use crate::repositories::InquiryRepository;

/// Public intake payload.
#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
    pub related_booking: Option<Oid>,
}

/// Partial update payload for an inquiry.
#[derive(Debug, Clone, Default)]
pub struct InquiryChanges {
    pub status: Option<InquiryStatus>,
    pub priority: Option<Priority>,
    /// Reassignment is admin-only; `Some(None)` clears the assignment.
    pub assigned_agent: Option<Option<Oid>>,
}

pub struct InquiryService {
    inquiries: Arc<dyn InquiryRepository>,
    dispatcher: NotificationDispatcher,
}

impl InquiryService {
    pub fn new(inquiries: Arc<dyn InquiryRepository>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            inquiries,
            dispatcher,
        }
    }

    /// Unauthenticated intake from the public contact form.
    pub async fn create(&self, new: NewInquiry) -> Result<Inquiry, DomainError> {
        let inquiry = Inquiry::new(
            new.name,
            new.email,
            new.phone,
            new.subject,
            new.message,
            new.priority,
            new.related_booking,
        )?;
        let saved = self.inquiries.create(&inquiry).await?;
        info!(inquiry_id = %saved.id, priority = saved.priority.as_str(), "inquiry received");
        self.dispatcher.dispatch(NotificationEvent::InquiryReceived {
            name: saved.name.clone(),
            email: saved.email.clone(),
            phone: saved.phone.clone(),
            subject: saved.subject.clone(),
            message: saved.message.clone(),
        });
        Ok(saved)
    }

    /// Admins see everything; agents only what is assigned to them.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Inquiry>, DomainError> {
        if principal.role.is_admin() {
            self.inquiries.list(None).await
        } else {
            self.inquiries.list(Some(principal.id.clone())).await
        }
    }

    pub async fn get(&self, principal: &Principal, id: &Oid) -> Result<Inquiry, DomainError> {
        let inquiry = self
            .inquiries
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("inquiry"))?;
        require_assignee_or_admin(principal, inquiry.assigned_agent.as_ref())?;
        Ok(inquiry)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: &Oid,
        changes: InquiryChanges,
    ) -> Result<Inquiry, DomainError> {
        let mut inquiry = self
            .inquiries
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("inquiry"))?;
        require_assignee_or_admin(principal, inquiry.assigned_agent.as_ref())?;

        if let Some(assignment) = changes.assigned_agent {
            require_admin(principal)?;
            inquiry.assigned_agent = assignment;
        }
        if let Some(priority) = changes.priority {
            inquiry.priority = priority;
        }
        if let Some(status) = changes.status {
            inquiry.set_status(status)?;
        }

        let saved = self.inquiries.update(&inquiry).await?;
        info!(inquiry_id = %saved.id, status = saved.status.as_str(), "inquiry updated");
        Ok(saved)
    }

    /// Append a response to the thread and notify the customer. The first
    /// response moves a pending inquiry to responded.
    pub async fn respond(
        &self,
        principal: &Principal,
        id: &Oid,
        message: String,
        responder_name: &str,
    ) -> Result<Inquiry, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::validation("message: must not be empty"));
        }
        let mut inquiry = self
            .inquiries
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("inquiry"))?;
        require_assignee_or_admin(principal, inquiry.assigned_agent.as_ref())?;

        let response: InquiryResponse =
            inquiry.record_response(principal.id.clone(), message).clone();
        self.inquiries.append_response(id, &response).await?;
        let saved = self.inquiries.update(&inquiry).await?;
        info!(
            inquiry_id = %saved.id,
            responses = saved.responses.len(),
            "inquiry response recorded"
        );
        self.dispatcher.dispatch(NotificationEvent::InquiryResponse {
            customer_email: saved.email.clone(),
            customer_name: saved.name.clone(),
            subject: saved.subject.clone(),
            response: response.message,
            responder_name: responder_name.to_string(),
        });
        Ok(saved)
    }

    pub async fn approve(&self, principal: &Principal, id: &Oid) -> Result<Inquiry, DomainError> {
        require_admin(principal)?;
        let mut inquiry = self
            .inquiries
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("inquiry"))?;
        inquiry.approve()?;
        let saved = self.inquiries.update(&inquiry).await?;
        info!(inquiry_id = %saved.id, "inquiry approved");
        Ok(saved)
    }

    pub async fn reject(&self, principal: &Principal, id: &Oid) -> Result<Inquiry, DomainError> {
        require_admin(principal)?;
        let mut inquiry = self
            .inquiries
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("inquiry"))?;
        inquiry.reject();
        let saved = self.inquiries.update(&inquiry).await?;
        info!(inquiry_id = %saved.id, "inquiry rejected and closed");
        Ok(saved)
    }

    pub async fn delete(&self, principal: &Principal, id: &Oid) -> Result<(), DomainError> {
        require_admin(principal)?;
        if self.inquiries.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound("inquiry"));
        }
        self.inquiries.delete(id).await?;
        info!(inquiry_id = %id, "inquiry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::notification::test_support::RecordingNotifier;
    use crate::repositories::inquiry_repository::MockInquiryRepository;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Oid::new(),
            role,
            company_id: Some(Oid::new()),
        }
    }

    fn new_inquiry() -> NewInquiry {
        NewInquiry {
            name: "Fatima Noor".into(),
            email: "fatima@example.com".into(),
            phone: None,
            subject: "Visa processing time".into(),
            message: "How long does the visa usually take?".into(),
            priority: Priority::High,
            related_booking: None,
        }
    }

    fn service_with(
        repo: MockInquiryRepository,
        notifier: Arc<RecordingNotifier>,
    ) -> InquiryService {
        InquiryService::new(Arc::new(repo), NotificationDispatcher::new(notifier))
    }

    #[tokio::test]
    async fn test_public_create_notifies_back_office() {
        let mut repo = MockInquiryRepository::new();
        repo.expect_create().returning(|i| Ok(i.clone()));
        let notifier = Arc::new(RecordingNotifier::new(false));
        let service = service_with(repo, notifier.clone());

        let saved = service.create(new_inquiry()).await.unwrap();
        assert_eq!(saved.status, InquiryStatus::Pending);

        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent.lock().unwrap().as_slice(),
            ["inquiry_received"]
        );
    }

    #[tokio::test]
    async fn test_agent_list_is_scoped_to_assignments() {
        let agent = principal(Role::Agent);
        let agent_id = agent.id.clone();
        let mut repo = MockInquiryRepository::new();
        repo.expect_list()
            .withf(move |assigned| assigned.as_ref() == Some(&agent_id))
            .returning(|_| Ok(vec![]));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));
        assert!(service.list(&agent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_list_is_unscoped() {
        let mut repo = MockInquiryRepository::new();
        repo.expect_list()
            .withf(|assigned| assigned.is_none())
            .returning(|_| Ok(vec![]));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));
        assert!(service.list(&principal(Role::Admin)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unassigned_inquiry_hidden_from_agents() {
        let inquiry = Inquiry::new(
            new_inquiry().name,
            new_inquiry().email,
            None,
            new_inquiry().subject,
            new_inquiry().message,
            Priority::Medium,
            None,
        )
        .unwrap();
        let id = inquiry.id.clone();

        let mut repo = MockInquiryRepository::new();
        let found = inquiry.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        assert!(matches!(
            service.get(&principal(Role::Agent), &id).await,
            Err(DomainError::Forbidden)
        ));
        assert!(service.get(&principal(Role::Admin), &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_assignment_change_is_admin_only() {
        let agent = principal(Role::Agent);
        let mut inquiry = Inquiry::new(
            "A".repeat(4),
            "a@example.com".into(),
            None,
            "subject".into(),
            "message".into(),
            Priority::Low,
            None,
        )
        .unwrap();
        inquiry.assigned_agent = Some(agent.id.clone());
        let id = inquiry.id.clone();

        let mut repo = MockInquiryRepository::new();
        let found = inquiry.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        let changes = InquiryChanges {
            assigned_agent: Some(None),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&agent, &id, changes).await,
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_respond_appends_and_notifies_customer() {
        let agent = principal(Role::Agent);
        let mut inquiry = Inquiry::new(
            "Fatima Noor".into(),
            "fatima@example.com".into(),
            None,
            "Visa processing time".into(),
            "How long?".into(),
            Priority::High,
            None,
        )
        .unwrap();
        inquiry.assigned_agent = Some(agent.id.clone());
        let id = inquiry.id.clone();

        let mut repo = MockInquiryRepository::new();
        let found = inquiry.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_append_response().returning(|_, _| Ok(()));
        repo.expect_update().returning(|i| Ok(i.clone()));
        let notifier = Arc::new(RecordingNotifier::new(false));
        let service = service_with(repo, notifier.clone());

        let saved = service
            .respond(&agent, &id, "Usually 5 working days.".into(), "Agent Smith")
            .await
            .unwrap();
        assert_eq!(saved.status, InquiryStatus::Responded);
        assert_eq!(saved.responses.len(), 1);

        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent.lock().unwrap().as_slice(),
            ["inquiry_response"]
        );
    }

    #[tokio::test]
    async fn test_approve_on_closed_inquiry_is_illegal() {
        let mut inquiry = Inquiry::new(
            "Fatima Noor".into(),
            "fatima@example.com".into(),
            None,
            "subject".into(),
            "message".into(),
            Priority::Medium,
            None,
        )
        .unwrap();
        inquiry.set_status(InquiryStatus::Closed).unwrap();
        let id = inquiry.id.clone();

        let mut repo = MockInquiryRepository::new();
        let found = inquiry.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        assert!(matches!(
            service.approve(&principal(Role::Admin), &id).await,
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_reject_pins_rejected_and_closed() {
        let inquiry = Inquiry::new(
            "Fatima Noor".into(),
            "fatima@example.com".into(),
            None,
            "subject".into(),
            "message".into(),
            Priority::Medium,
            None,
        )
        .unwrap();
        let id = inquiry.id.clone();

        let mut repo = MockInquiryRepository::new();
        let found = inquiry.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update().returning(|i| Ok(i.clone()));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        let saved = service.reject(&principal(Role::Admin), &id).await.unwrap();
        assert_eq!(saved.status, InquiryStatus::Closed);
        assert_eq!(saved.approval_status.as_str(), "rejected");
    }
}
