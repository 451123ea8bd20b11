//! User / agent entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::Oid;
use crate::error::DomainError;

/// Role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "agent" => Some(Role::Agent),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Agent
    }
}

/// A tenant-scoped user account. Agents own bookings; admins ratify them.
/// Platform super admins live in the platform database with no company.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Oid,

    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub phone: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        role: Role,
        phone: Option<String>,
    ) -> Result<Self, DomainError> {
        let user = Self {
            id: Oid::new(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            phone,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        user.validate()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new(
            "Amira".into(),
            "  Amira@Example.COM ".into(),
            "hash".into(),
            Role::Agent,
            None,
        )
        .unwrap();
        assert_eq!(user.email, "amira@example.com");
        assert_eq!(user.role, Role::Agent);
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = User::new(
            "Amira".into(),
            "not-an-email".into(),
            "hash".into(),
            Role::Agent,
            None,
        );
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Agent, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("owner"), None);
        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::Agent.is_admin());
    }
}
