//! User / agent service

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::ValidateEmail;

use caravan_security::password::PasswordService;
use caravan_shared::constants::MIN_PASSWORD_LENGTH;

use crate::authz::{require_admin, require_owner_or_admin, Principal};
use crate::domain::{AgentPerformance, Oid, Role, User};
use crate::error::DomainError;
use crate::repositories::{BookingRepository, UserRepository};

/// Partial update payload for a user. Role and activation changes are
/// admin-only; self-service edits cover name, email, phone and password.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { users, bookings }
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<User>, DomainError> {
        require_admin(principal)?;
        self.users.list().await
    }

    pub async fn get(&self, principal: &Principal, id: &Oid) -> Result<User, DomainError> {
        require_owner_or_admin(principal, id)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("user"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: &Oid,
        changes: UserChanges,
    ) -> Result<User, DomainError> {
        require_owner_or_admin(principal, id)?;
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("user"))?;

        if changes.role.is_some() || changes.is_active.is_some() {
            require_admin(principal)?;
        }

        if let Some(name) = changes.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = changes.email {
            let email = email.trim().to_lowercase();
            if !email.validate_email() {
                return Err(DomainError::validation(
                    "email: must be a valid email address",
                ));
            }
            if let Some(existing) = self.users.find_by_email(&email).await? {
                if existing.id != user.id {
                    return Err(DomainError::validation("email: already in use"));
                }
            }
            user.email = email;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        if let Some(password) = changes.password {
            if password.len() < MIN_PASSWORD_LENGTH {
                return Err(DomainError::validation(
                    "password: must be at least 8 characters",
                ));
            }
            user.password_hash = PasswordService::hash(&password)
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();

        let saved = self.users.update(&user).await?;
        info!(user_id = %saved.id, role = saved.role.as_str(), "user updated");
        Ok(saved)
    }

    pub async fn delete(&self, principal: &Principal, id: &Oid) -> Result<(), DomainError> {
        require_admin(principal)?;
        if self.users.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound("user"));
        }
        self.users.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Booking-derived figures for one agent. Agents can see their own,
    /// admins anyone's.
    pub async fn performance(
        &self,
        principal: &Principal,
        agent_id: &Oid,
    ) -> Result<AgentPerformance, DomainError> {
        require_owner_or_admin(principal, agent_id)?;
        if self.users.find_by_id(agent_id).await?.is_none() {
            return Err(DomainError::NotFound("user"));
        }
        let bookings = self.bookings.list_by_agent(agent_id).await?;
        Ok(AgentPerformance::from_bookings(&bookings, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::booking_repository::MockBookingRepository;
    use crate::repositories::user_repository::MockUserRepository;

    fn principal(id: Oid, role: Role) -> Principal {
        Principal {
            id,
            role,
            company_id: Some(Oid::new()),
        }
    }

    fn user(role: Role) -> User {
        User::new(
            "Amira Shah".into(),
            "amira@example.com".into(),
            "hash".into(),
            role,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_requires_admin() {
        let service = UserService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockBookingRepository::new()),
        );
        assert!(matches!(
            service.list(&principal(Oid::new(), Role::Agent)).await,
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_agent_can_update_own_profile_but_not_role() {
        let target = user(Role::Agent);
        let id = target.id.clone();
        let me = principal(id.clone(), Role::Agent);

        let mut users = MockUserRepository::new();
        let found = target.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users.expect_update().returning(|u| Ok(u.clone()));
        let service = UserService::new(Arc::new(users), Arc::new(MockBookingRepository::new()));

        let saved = service
            .update(
                &me,
                &id,
                UserChanges {
                    name: Some("Amira S.".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.name, "Amira S.");

        assert!(matches!(
            service
                .update(
                    &me,
                    &id,
                    UserChanges {
                        role: Some(Role::Admin),
                        ..Default::default()
                    },
                )
                .await,
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let target = user(Role::Agent);
        let id = target.id.clone();
        let me = principal(id.clone(), Role::Agent);

        let mut users = MockUserRepository::new();
        let found = target.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let service = UserService::new(Arc::new(users), Arc::new(MockBookingRepository::new()));

        assert!(matches!(
            service
                .update(
                    &me,
                    &id,
                    UserChanges {
                        password: Some("short".into()),
                        ..Default::default()
                    },
                )
                .await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_performance_owner_or_admin_only() {
        let target = user(Role::Agent);
        let id = target.id.clone();

        let mut users = MockUserRepository::new();
        let found = target.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_list_by_agent().returning(|_| Ok(vec![]));
        let service = UserService::new(Arc::new(users), Arc::new(bookings));

        assert!(matches!(
            service
                .performance(&principal(Oid::new(), Role::Agent), &id)
                .await,
            Err(DomainError::Forbidden)
        ));
        let perf = service
            .performance(&principal(Oid::new(), Role::Admin), &id)
            .await
            .unwrap();
        assert_eq!(perf.total_bookings, 0);
    }
}
