//! Inquiry repository trait (port) — tenant scope

use async_trait::async_trait;

use crate::domain::{Inquiry, InquiryResponse, Oid};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Inquiry>, DomainError>;
    /// Newest first; `assigned_to` restricts to one agent's inquiries.
    async fn list(&self, assigned_to: Option<Oid>) -> Result<Vec<Inquiry>, DomainError>;
    async fn create(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError>;
    /// Persists status/approval/assignment fields; responses go through
    /// `append_response` so the store observes arrival order.
    async fn update(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError>;
    async fn append_response(
        &self,
        inquiry_id: &Oid,
        response: &InquiryResponse,
    ) -> Result<(), DomainError>;
    async fn delete(&self, id: &Oid) -> Result<(), DomainError>;
}
