//! Company repository trait (port) — platform scope

use async_trait::async_trait;

use crate::domain::{Company, Oid};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Company>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DomainError>;
    async fn list(&self) -> Result<Vec<Company>, DomainError>;
    async fn create(&self, company: &Company) -> Result<Company, DomainError>;
    async fn update(&self, company: &Company) -> Result<Company, DomainError>;
}
