//! Booking repository trait (port) — tenant scope

use async_trait::async_trait;

use crate::domain::{Booking, BookingState, Oid};
use crate::error::DomainError;

/// Optional list filters (`?status=&agent=` on the wire).
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub state: Option<BookingState>,
    pub agent_id: Option<Oid>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Booking>, DomainError>;
    /// Newest first.
    async fn list(&self, filter: BookingFilter) -> Result<Vec<Booking>, DomainError>;
    async fn list_by_agent(&self, agent_id: &Oid) -> Result<Vec<Booking>, DomainError>;
    async fn create(&self, booking: &Booking) -> Result<Booking, DomainError>;
    async fn update(&self, booking: &Booking) -> Result<Booking, DomainError>;
    async fn delete(&self, id: &Oid) -> Result<(), DomainError>;
}
