//! Canonical entity identifier
//!
//! Every entity and company id in the system is a 24-character lowercase
//! hex string. Parsing happens once at the boundary; anything that is not
//! 24 hex characters is rejected rather than guessed at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use caravan_shared::constants::CANONICAL_ID_LENGTH;

use crate::error::DomainError;

/// A canonical 24-hex-character identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    /// Generate a fresh identifier from 12 random bytes.
    pub fn new() -> Self {
        let bytes: [u8; 12] = rand::random();
        Oid(hex::encode(bytes))
    }

    /// Parse and normalize an identifier. Uppercase hex is lowercased;
    /// any other shape is a validation failure.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.len() != CANONICAL_ID_LENGTH
            || !trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(DomainError::validation(format!(
                "id: expected a {}-character hex identifier",
                CANONICAL_ID_LENGTH
            )));
        }
        Ok(Oid(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Oid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Oid {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::parse(s)
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Oid::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_canonical() {
        let id = Oid::new();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id.as_str(), id.as_str().to_ascii_lowercase());
    }

    #[test]
    fn test_parse_normalizes_uppercase() {
        let id = Oid::parse("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.as_str(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(Oid::parse("").is_err());
        assert!(Oid::parse("507f1f77bcf86cd79943901").is_err()); // 23 chars
        assert!(Oid::parse("507f1f77bcf86cd7994390111").is_err()); // 25 chars
        assert!(Oid::parse("507f1f77bcf86cd79943901z").is_err()); // non-hex
        assert!(Oid::parse("{\"$oid\":\"507f1f77bcf8\"}").is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(Oid::new(), Oid::new());
    }
}
