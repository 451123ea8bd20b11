//! Authentication service
//!
//! Login and agent registration against one scope's user store: a tenant's
//! `users` collection, or the platform store for super admins. The caller
//! picks the scope by handing in the matching repository.

use std::sync::Arc;

use tracing::{info, warn};

use caravan_security::{JwtService, PasswordService};
use caravan_shared::constants::MIN_PASSWORD_LENGTH;
use caravan_shared::utils::mask_email;

use crate::domain::{Oid, Role, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    /// Company the user store belongs to; `None` in platform scope.
    company_id: Option<Oid>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>, company_id: Option<Oid>) -> Self {
        Self {
            users,
            jwt,
            company_id,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %mask_email(&email), "login failed: unknown email");
                DomainError::Unauthenticated
            })?;

        if !user.is_active {
            warn!(email = %mask_email(&email), "login failed: account inactive");
            return Err(DomainError::Unauthenticated);
        }

        let valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthenticated)?;
        if !valid {
            warn!(email = %mask_email(&email), "login failed: bad password");
            return Err(DomainError::Unauthenticated);
        }

        let access_token = self.issue_token(&user)?;
        info!(user_id = %user.id, "login successful");
        Ok(LoginResult { user, access_token })
    }

    /// Self-registration of a new agent account within the tenant.
    pub async fn register_agent(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<String>,
    ) -> Result<LoginResult, DomainError> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "password: must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let email = email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %mask_email(&email), "registration failed: email exists");
            return Err(DomainError::validation("email: already registered"));
        }

        let hash = PasswordService::hash(password)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let user = User::new(name.to_string(), email, hash, Role::Agent, phone)?;
        let user = self.users.create(&user).await?;
        let access_token = self.issue_token(&user)?;
        info!(user_id = %user.id, "agent registered");
        Ok(LoginResult { user, access_token })
    }

    pub async fn current_user(&self, id: &Oid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_access_token(
                user.id.as_str(),
                user.role.as_str(),
                self.company_id.as_ref().map(|c| c.as_str().to_string()),
            )
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
