//! Authorization gate
//!
//! Role checks applied before any state transition or store access.
//! `Forbidden` deliberately carries no resource detail; callers that need
//! to hide existence return it in place of `NotFound`.

use serde::Serialize;

use crate::domain::{Oid, Role};
use crate::error::DomainError;

/// The authenticated actor on a request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Oid,
    pub role: Role,
    /// Owning company; `None` for platform super admins.
    pub company_id: Option<Oid>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Admin-only operations: approve/reject, delete agents, list all users.
pub fn require_admin(principal: &Principal) -> Result<(), DomainError> {
    if principal.role.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Tenant-management operations (company CRUD) are reserved for platform
/// super admins.
pub fn require_super_admin(principal: &Principal) -> Result<(), DomainError> {
    if principal.role == Role::SuperAdmin {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Owner-or-admin operations: reading or mutating a booking/inquiry.
pub fn require_owner_or_admin(principal: &Principal, owner_id: &Oid) -> Result<(), DomainError> {
    if principal.role.is_admin() || &principal.id == owner_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Variant for optionally-assigned resources (inquiries): an unassigned
/// resource is admin-only.
pub fn require_assignee_or_admin(
    principal: &Principal,
    assignee: Option<&Oid>,
) -> Result<(), DomainError> {
    if principal.role.is_admin() || assignee == Some(&principal.id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
