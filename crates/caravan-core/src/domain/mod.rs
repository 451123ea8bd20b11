//! Domain entities for the caravan back office.

pub mod booking;
pub mod company;
pub mod inquiry;
pub mod oid;
pub mod performance;
pub mod user;

pub use booking::{
    Booking, BookingAction, BookingDraft, BookingState, FlightClass, FlightDetails, HotelDetails,
    PaymentInfo, PaymentMethod, TransportDetails, TransportType, VisaDetails, VisaType,
};
pub use company::{Company, ConnectionDescriptor, ContactInfo};
pub use inquiry::{ApprovalStatus, Inquiry, InquiryResponse, InquiryStatus, Priority};
pub use oid::Oid;
pub use performance::{AgentPerformance, RecentBooking};
pub use user::{Role, User};
