//! JWT access token handling
//!
//! Tokens carry the acting user's id, role, and (for tenant-scoped users)
//! the company the account belongs to. Platform super admins carry no
//! company claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id (canonical 24-hex form).
    pub sub: String,
    /// Role as stored on the user record.
    pub role: String,
    /// Owning company id, absent for platform super admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_token_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: &str,
        role: &str,
        company: Option<String>,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            company,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_claims() {
        let service = JwtService::new("test-secret".to_string(), 3600);
        let token = service
            .generate_access_token(
                "507f1f77bcf86cd799439011",
                "agent",
                Some("507f1f77bcf86cd799439022".to_string()),
            )
            .unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "507f1f77bcf86cd799439011");
        assert_eq!(claims.role, "agent");
        assert_eq!(claims.company.as_deref(), Some("507f1f77bcf86cd799439022"));
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let issuer = JwtService::new("secret-a".to_string(), 3600);
        let verifier = JwtService::new("secret-b".to_string(), 3600);
        let token = issuer
            .generate_access_token("507f1f77bcf86cd799439011", "admin", None)
            .unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }
}
