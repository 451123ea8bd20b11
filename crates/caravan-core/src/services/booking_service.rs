//! Booking service
//!
//! Authorization gate first, then the state machine, then persistence,
//! then fire-and-forget notification. A booking whose email never went out
//! is still a booked booking.

use std::sync::Arc;

use tracing::info;
use validator::ValidateEmail;

use crate::authz::{require_admin, require_owner_or_admin, Principal};
use crate::domain::{Booking, BookingAction, BookingDraft, BookingState, Oid};
use crate::error::DomainError;
use crate::notification::{NotificationDispatcher, NotificationEvent};
use crate::repositories::{BookingFilter, BookingRepository};

/// Partial update payload for a booking.
#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    /// Target operational status; admin-only, drives the combined state.
    pub status: Option<BookingState>,
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    dispatcher: NotificationDispatcher,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            bookings,
            dispatcher,
        }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        draft: BookingDraft,
    ) -> Result<Booking, DomainError> {
        let booking = Booking::create(draft, principal.id.clone())?;
        let saved = self.bookings.create(&booking).await?;
        info!(booking_id = %saved.id, agent_id = %saved.agent_id, "booking created");
        self.dispatcher.dispatch(NotificationEvent::BookingConfirmation {
            customer_email: saved.customer_email.clone(),
            customer_name: saved.customer_name.clone(),
            package: saved.package.clone(),
            total_amount: saved.total_amount,
            departure_date: saved.departure_date,
            status: saved.state.status().to_string(),
        });
        Ok(saved)
    }

    /// Admin-only full listing with optional filters.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, DomainError> {
        require_admin(principal)?;
        self.bookings.list(filter).await
    }

    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<Booking>, DomainError> {
        self.bookings.list_by_agent(&principal.id).await
    }

    pub async fn get(&self, principal: &Principal, id: &Oid) -> Result<Booking, DomainError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("booking"))?;
        require_owner_or_admin(principal, &booking.agent_id)?;
        Ok(booking)
    }

    /// Read-only view for the document-renderer collaborator; same gate as
    /// a read, no write access implied.
    pub async fn snapshot(&self, principal: &Principal, id: &Oid) -> Result<Booking, DomainError> {
        self.get(principal, id).await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: &Oid,
        changes: BookingChanges,
    ) -> Result<Booking, DomainError> {
        let mut booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("booking"))?;
        require_owner_or_admin(principal, &booking.agent_id)?;

        if let Some(name) = changes.customer_name {
            if name.trim().len() < 2 {
                return Err(DomainError::validation(
                    "customerName: must be at least 2 characters",
                ));
            }
            booking.customer_name = name.trim().to_string();
        }
        if let Some(email) = changes.customer_email {
            if !email.validate_email() {
                return Err(DomainError::validation(
                    "customerEmail: must be a valid email address",
                ));
            }
            booking.customer_email = email.trim().to_lowercase();
        }

        // Field edits never move the state; an explicit status change runs
        // the machine and is rejected for non-admins before anything moves.
        let action = match changes.status {
            Some(target) => BookingAction::SetStatus(target),
            None => BookingAction::EditFields,
        };
        booking.transition(action, principal.role)?;

        let saved = self.bookings.update(&booking).await?;
        info!(booking_id = %saved.id, status = saved.state.status(), "booking updated");
        Ok(saved)
    }

    pub async fn delete(&self, principal: &Principal, id: &Oid) -> Result<(), DomainError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("booking"))?;
        require_owner_or_admin(principal, &booking.agent_id)?;
        self.bookings.delete(id).await?;
        info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    pub async fn approve(&self, principal: &Principal, id: &Oid) -> Result<Booking, DomainError> {
        self.ratify(principal, id, BookingAction::Approve).await
    }

    pub async fn reject(&self, principal: &Principal, id: &Oid) -> Result<Booking, DomainError> {
        self.ratify(principal, id, BookingAction::Reject).await
    }

    async fn ratify(
        &self,
        principal: &Principal,
        id: &Oid,
        action: BookingAction,
    ) -> Result<Booking, DomainError> {
        require_admin(principal)?;
        let mut booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("booking"))?;
        booking.transition(action, principal.role)?;
        let saved = self.bookings.update(&booking).await?;
        info!(
            booking_id = %saved.id,
            status = saved.state.status(),
            approval = saved.state.approval_status(),
            "booking ratified"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{
        FlightDetails, HotelDetails, PaymentMethod, TransportDetails, VisaDetails,
    };
    use crate::domain::Role;
    use crate::notification::test_support::RecordingNotifier;
    use crate::repositories::booking_repository::MockBookingRepository;
    use chrono::{TimeZone, Utc};

    fn principal(role: Role) -> Principal {
        Principal {
            id: Oid::new(),
            role,
            company_id: Some(Oid::new()),
        }
    }

    fn draft() -> BookingDraft {
        BookingDraft {
            customer_name: "Hassan Iqbal".into(),
            customer_email: "hassan@example.com".into(),
            contact_number: "+441234567".into(),
            passengers: 2,
            adults: 2,
            children: 0,
            package: "Umrah Standard".into(),
            package_price: 1500.0,
            additional_services: vec![],
            total_amount: 3000.0,
            payment_method: PaymentMethod::CreditCard,
            date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            departure_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            return_date: Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap(),
            flight: FlightDetails::default(),
            hotel: HotelDetails::default(),
            visa: VisaDetails::default(),
            transport: TransportDetails::default(),
            card_number: None,
            cardholder_name: None,
            card_expiry: None,
        }
    }

    fn service_with(
        repo: MockBookingRepository,
        notifier: Arc<RecordingNotifier>,
    ) -> BookingService {
        BookingService::new(Arc::new(repo), NotificationDispatcher::new(notifier))
    }

    #[tokio::test]
    async fn test_create_succeeds_when_notifier_fails() {
        let mut repo = MockBookingRepository::new();
        repo.expect_create().returning(|b| Ok(b.clone()));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let service = service_with(repo, notifier.clone());

        let result = service.create(&principal(Role::Agent), draft()).await;
        assert!(result.is_ok(), "persisted booking must be returned");

        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent.lock().unwrap().as_slice(),
            ["booking_confirmation"]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_bad_date_range() {
        let repo = MockBookingRepository::new();
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));
        let mut d = draft();
        d.departure_date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        d.return_date = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            service.create(&principal(Role::Agent), d).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_other_agent_read_is_forbidden_admin_read_succeeds() {
        let owner = principal(Role::Agent);
        let booking = Booking::create(draft(), owner.id.clone()).unwrap();
        let id = booking.id.clone();

        let mut repo = MockBookingRepository::new();
        let found = booking.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        let stranger = principal(Role::Agent);
        assert!(matches!(
            service.get(&stranger, &id).await,
            Err(DomainError::Forbidden)
        ));
        assert!(service.get(&principal(Role::Admin), &id).await.is_ok());
        assert!(service.get(&owner, &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_approve_confirms_pending_booking() {
        let owner = principal(Role::Agent);
        let booking = Booking::create(draft(), owner.id.clone()).unwrap();
        let id = booking.id.clone();

        let mut repo = MockBookingRepository::new();
        let found = booking.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update().returning(|b| Ok(b.clone()));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        let approved = service.approve(&principal(Role::Admin), &id).await.unwrap();
        assert_eq!(approved.state, BookingState::Confirmed);
        assert_eq!(approved.state.status(), "confirmed");
        assert_eq!(approved.state.approval_status(), "approved");
    }

    #[tokio::test]
    async fn test_agent_cannot_approve() {
        let repo = MockBookingRepository::new();
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));
        assert!(matches!(
            service.approve(&principal(Role::Agent), &Oid::new()).await,
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_owner_name_edit_keeps_approval_untouched() {
        let owner = principal(Role::Agent);
        let booking = Booking::create(draft(), owner.id.clone()).unwrap();
        let id = booking.id.clone();

        let mut repo = MockBookingRepository::new();
        let found = booking.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update().returning(|b| Ok(b.clone()));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        let updated = service
            .update(
                &owner,
                &id,
                BookingChanges {
                    customer_name: Some("Hassan I.".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.customer_name, "Hassan I.");
        assert_eq!(updated.state.approval_status(), "pending");
    }

    #[tokio::test]
    async fn test_owner_cannot_set_status() {
        let owner = principal(Role::Agent);
        let booking = Booking::create(draft(), owner.id.clone()).unwrap();
        let id = booking.id.clone();

        let mut repo = MockBookingRepository::new();
        let found = booking.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));

        assert!(matches!(
            service
                .update(
                    &owner,
                    &id,
                    BookingChanges {
                        status: Some(BookingState::Confirmed),
                        ..Default::default()
                    },
                )
                .await,
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_within_tenant() {
        let mut repo = MockBookingRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let service = service_with(repo, Arc::new(RecordingNotifier::new(false)));
        assert!(matches!(
            service.get(&principal(Role::Admin), &Oid::new()).await,
            Err(DomainError::NotFound("booking"))
        ));
    }
}
