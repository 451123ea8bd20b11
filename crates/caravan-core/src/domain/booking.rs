//! Booking entity and the approval state machine
//!
//! A booking's operational status and approval status move together:
//! a pending booking awaits ratification, a confirmed booking has been
//! approved, a cancelled booking has been rejected. `BookingState` encodes
//! exactly those three legal combinations, so an "approved but pending"
//! booking cannot exist in this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Oid, Role};
use crate::error::DomainError;

/// The combined (status, approval status) of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Awaiting admin ratification (`status=pending`, `approvalStatus=pending`).
    Pending,
    /// Ratified (`status=confirmed`, `approvalStatus=approved`).
    Confirmed,
    /// Rejected or cancelled (`status=cancelled`, `approvalStatus=rejected`).
    Cancelled,
}

/// A trigger against the booking state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    /// Admin ratifies a pending booking.
    Approve,
    /// Admin rejects a pending booking.
    Reject,
    /// Admin forces the combined state (the status-update path).
    SetStatus(BookingState),
    /// Operational field edit (customer name/email); state never moves.
    EditFields,
}

impl BookingState {
    pub fn status(&self) -> &'static str {
        match self {
            BookingState::Pending => "pending",
            BookingState::Confirmed => "confirmed",
            BookingState::Cancelled => "cancelled",
        }
    }

    pub fn approval_status(&self) -> &'static str {
        match self {
            BookingState::Pending => "pending",
            BookingState::Confirmed => "approved",
            BookingState::Cancelled => "rejected",
        }
    }

    pub fn from_status(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingState::Pending),
            "confirmed" => Some(BookingState::Confirmed),
            "cancelled" => Some(BookingState::Cancelled),
            _ => None,
        }
    }

    /// Total transition function: every (state, action, role) has a defined
    /// outcome. Only admins move state at all; approve/reject require the
    /// booking to still be awaiting ratification, while the explicit
    /// status-set path overwrites deterministically.
    pub fn apply(self, action: BookingAction, role: Role) -> Result<BookingState, DomainError> {
        match action {
            BookingAction::EditFields => Ok(self),
            BookingAction::SetStatus(target) => {
                if !role.is_admin() {
                    return Err(DomainError::Forbidden);
                }
                Ok(target)
            }
            BookingAction::Approve => {
                if !role.is_admin() {
                    return Err(DomainError::Forbidden);
                }
                match self {
                    BookingState::Pending => Ok(BookingState::Confirmed),
                    other => Err(DomainError::IllegalTransition {
                        from: other.status(),
                        action: "approve",
                    }),
                }
            }
            BookingAction::Reject => {
                if !role.is_admin() {
                    return Err(DomainError::Forbidden);
                }
                match self {
                    BookingState::Pending => Ok(BookingState::Cancelled),
                    other => Err(DomainError::IllegalTransition {
                        from: other.status(),
                        action: "reject",
                    }),
                }
            }
        }
    }
}

impl Default for BookingState {
    fn default() -> Self {
        BookingState::Pending
    }
}

/// Payment method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    Cash,
    Installments,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Installments => "installments",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cash" => Some(PaymentMethod::Cash),
            "installments" => Some(PaymentMethod::Installments),
            _ => None,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::CreditCard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightClass {
    Economy,
    Business,
    First,
}

impl FlightClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightClass::Economy => "economy",
            FlightClass::Business => "business",
            FlightClass::First => "first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "economy" => Some(FlightClass::Economy),
            "business" => Some(FlightClass::Business),
            "first" => Some(FlightClass::First),
            _ => None,
        }
    }
}

impl Default for FlightClass {
    fn default() -> Self {
        FlightClass::Economy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaType {
    Umrah,
    Hajj,
    Tourist,
}

impl VisaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisaType::Umrah => "umrah",
            VisaType::Hajj => "hajj",
            VisaType::Tourist => "tourist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "umrah" => Some(VisaType::Umrah),
            "hajj" => Some(VisaType::Hajj),
            "tourist" => Some(VisaType::Tourist),
            _ => None,
        }
    }
}

impl Default for VisaType {
    fn default() -> Self {
        VisaType::Umrah
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Bus,
    Car,
    Van,
    Taxi,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Bus => "bus",
            TransportType::Car => "car",
            TransportType::Van => "van",
            TransportType::Taxi => "taxi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bus" => Some(TransportType::Bus),
            "car" => Some(TransportType::Car),
            "van" => Some(TransportType::Van),
            "taxi" => Some(TransportType::Taxi),
            _ => None,
        }
    }
}

impl Default for TransportType {
    fn default() -> Self {
        TransportType::Bus
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightDetails {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub flight_class: FlightClass,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotelDetails {
    pub hotel_name: Option<String>,
    pub room_type: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisaDetails {
    pub visa_type: VisaType,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportDetails {
    pub transport_type: TransportType,
    pub pickup_location: Option<String>,
}

/// Sanitized card data: only the last four digits survive intake; the full
/// PAN and CVV are never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub card_last4: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiry: Option<String>,
}

/// Validated intake data for a new booking.
#[derive(Debug, Clone, Validate)]
pub struct BookingDraft {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub customer_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub customer_email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub contact_number: String,

    #[validate(range(min = 1, message = "must be at least 1"))]
    pub passengers: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub children: i32,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub package: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub package_price: f64,
    pub additional_services: Vec<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_amount: f64,
    pub payment_method: PaymentMethod,

    pub date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,

    pub flight: FlightDetails,
    pub hotel: HotelDetails,
    pub visa: VisaDetails,
    pub transport: TransportDetails,

    /// Raw card number from intake; reduced to last4 before storage.
    pub card_number: Option<String>,
    pub cardholder_name: Option<String>,
    pub card_expiry: Option<String>,
}

impl BookingDraft {
    fn check_invariants(&self) -> Result<(), DomainError> {
        let mut details = Vec::new();
        if self.return_date <= self.departure_date {
            details.push("returnDate: must be after departureDate".to_string());
        }
        let consistent = self
            .adults
            .checked_add(self.children)
            .is_some_and(|sum| sum == self.passengers);
        if !consistent {
            details.push("passengers: must equal adults + children".to_string());
        }
        if details.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation { details })
        }
    }

    fn sanitized_payment(&self) -> PaymentInfo {
        PaymentInfo {
            card_last4: self.card_number.as_ref().map(|n| {
                let digits: String = n.chars().filter(|c| c.is_ascii_digit()).collect();
                let cut = digits.len().saturating_sub(4);
                digits[cut..].to_string()
            }),
            cardholder_name: self.cardholder_name.clone(),
            expiry: self.card_expiry.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Oid,

    pub customer_name: String,
    pub customer_email: String,
    pub contact_number: String,
    pub passengers: i32,
    pub adults: i32,
    pub children: i32,

    pub package: String,
    pub package_price: f64,
    pub additional_services: Vec<String>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,

    pub date: DateTime<Utc>,
    pub departure_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,

    pub flight: FlightDetails,
    pub hotel: HotelDetails,
    pub visa: VisaDetails,
    pub transport: TransportDetails,
    pub payment: PaymentInfo,

    pub state: BookingState,

    /// Owning agent. May dangle after agent deletion; readers tolerate it.
    pub agent_id: Oid,
    pub customer_group: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a new booking from validated intake. Always starts awaiting
    /// approval, owned by the creating agent.
    pub fn create(draft: BookingDraft, agent_id: Oid) -> Result<Self, DomainError> {
        draft.validate()?;
        draft.check_invariants()?;
        let payment = draft.sanitized_payment();
        let customer_email = draft.customer_email.trim().to_lowercase();
        let customer_group = Some(customer_email.clone());
        Ok(Self {
            id: Oid::new(),
            customer_name: draft.customer_name,
            customer_email,
            contact_number: draft.contact_number,
            passengers: draft.passengers,
            adults: draft.adults,
            children: draft.children,
            package: draft.package,
            package_price: draft.package_price,
            additional_services: draft.additional_services,
            total_amount: draft.total_amount,
            payment_method: draft.payment_method,
            date: draft.date,
            departure_date: draft.departure_date,
            return_date: draft.return_date,
            flight: draft.flight,
            hotel: draft.hotel,
            visa: draft.visa,
            transport: draft.transport,
            payment,
            state: BookingState::Pending,
            agent_id,
            customer_group,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    /// Run a trigger through the state machine and record the outcome.
    pub fn transition(&mut self, action: BookingAction, role: Role) -> Result<(), DomainError> {
        self.state = self.state.apply(action, role)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> BookingDraft {
        BookingDraft {
            customer_name: "Hassan Iqbal".into(),
            customer_email: "hassan@example.com".into(),
            contact_number: "+441234567".into(),
            passengers: 3,
            adults: 2,
            children: 1,
            package: "Ramadan Umrah 14 nights".into(),
            package_price: 1800.0,
            additional_services: vec!["ziyarat".into()],
            total_amount: 5400.0,
            payment_method: PaymentMethod::BankTransfer,
            date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            departure_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            return_date: Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap(),
            flight: FlightDetails::default(),
            hotel: HotelDetails::default(),
            visa: VisaDetails::default(),
            transport: TransportDetails::default(),
            card_number: Some("4111 1111 1111 1234".into()),
            cardholder_name: Some("Hassan Iqbal".into()),
            card_expiry: Some("12/27".into()),
        }
    }

    #[test]
    fn test_create_starts_awaiting_approval() {
        let booking = Booking::create(draft(), Oid::new()).unwrap();
        assert_eq!(booking.state, BookingState::Pending);
        assert_eq!(booking.state.status(), "pending");
        assert_eq!(booking.state.approval_status(), "pending");
    }

    #[test]
    fn test_return_before_departure_rejected() {
        let mut d = draft();
        d.departure_date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        d.return_date = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let err = Booking::create(d, Oid::new()).unwrap_err();
        match err {
            DomainError::Validation { details } => {
                assert!(details.iter().any(|d| d.contains("returnDate")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_passenger_count_must_be_consistent() {
        let mut d = draft();
        d.passengers = 5;
        assert!(matches!(
            Booking::create(d, Oid::new()),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_passenger_count_overflow_is_rejected() {
        let mut d = draft();
        d.adults = i32::MAX;
        d.children = 1;
        d.passengers = 1;
        assert!(matches!(
            Booking::create(d, Oid::new()),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_card_number_reduced_to_last4() {
        let booking = Booking::create(draft(), Oid::new()).unwrap();
        assert_eq!(booking.payment.card_last4.as_deref(), Some("1234"));
    }

    #[test]
    fn test_approve_requires_awaiting_state() {
        let state = BookingState::Pending;
        assert_eq!(
            state.apply(BookingAction::Approve, Role::Admin).unwrap(),
            BookingState::Confirmed
        );
        assert!(matches!(
            BookingState::Confirmed.apply(BookingAction::Approve, Role::Admin),
            Err(DomainError::IllegalTransition { .. })
        ));
        assert!(matches!(
            BookingState::Cancelled.apply(BookingAction::Reject, Role::Admin),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_reject_moves_to_cancelled() {
        assert_eq!(
            BookingState::Pending
                .apply(BookingAction::Reject, Role::Admin)
                .unwrap(),
            BookingState::Cancelled
        );
    }

    #[test]
    fn test_non_admin_cannot_drive_state() {
        for action in [
            BookingAction::Approve,
            BookingAction::Reject,
            BookingAction::SetStatus(BookingState::Confirmed),
        ] {
            assert!(matches!(
                BookingState::Pending.apply(action, Role::Agent),
                Err(DomainError::Forbidden)
            ));
        }
    }

    #[test]
    fn test_admin_set_status_overwrites_deterministically() {
        assert_eq!(
            BookingState::Confirmed
                .apply(BookingAction::SetStatus(BookingState::Pending), Role::Admin)
                .unwrap(),
            BookingState::Pending
        );
        assert_eq!(
            BookingState::Pending
                .apply(
                    BookingAction::SetStatus(BookingState::Cancelled),
                    Role::Admin
                )
                .unwrap(),
            BookingState::Cancelled
        );
    }

    #[test]
    fn test_field_edit_never_moves_state() {
        for state in [
            BookingState::Pending,
            BookingState::Confirmed,
            BookingState::Cancelled,
        ] {
            assert_eq!(state.apply(BookingAction::EditFields, Role::Agent).unwrap(), state);
            assert_eq!(state.apply(BookingAction::EditFields, Role::Admin).unwrap(), state);
        }
    }

    /// approvalStatus=approved ⇔ status=confirmed, rejected ⇔ cancelled,
    /// for every reachable state.
    #[test]
    fn test_status_and_approval_stay_correlated() {
        for state in [
            BookingState::Pending,
            BookingState::Confirmed,
            BookingState::Cancelled,
        ] {
            match state.approval_status() {
                "approved" => assert_eq!(state.status(), "confirmed"),
                "rejected" => assert_eq!(state.status(), "cancelled"),
                "pending" => assert_eq!(state.status(), "pending"),
                other => panic!("unexpected approval status {other}"),
            }
        }
    }
}
