//! HTTP handlers

pub mod agents;
pub mod auth;
pub mod bookings;
pub mod companies;
pub mod health;
pub mod inquiries;

use caravan_core::domain::Oid;
use caravan_infrastructure::TenantStores;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the tenant's repository bundle for this request.
pub(crate) async fn stores(state: &AppState, company_id: &Oid) -> Result<TenantStores, ApiError> {
    Ok(state.registry.stores(company_id).await?)
}
