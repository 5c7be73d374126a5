//! Creator identities and the secrets derived from them.
//!
//! An identity is the creator's public account string (typically a wallet
//! address such as `0xAbC...`). Storage keys and the encryption secret both use
//! the lower-cased form, so `0xABC` and `0xabc` address the same history.
//!
//! # Security
//!
//! The "secret" handed to the encryptor and the commitment hash is the public
//! identity itself. Anyone who knows the address can derive the same key, so
//! blob encryption here is not a confidentiality boundary. Downstream
//! verification depends on re-deriving the key from the public identity,
//! which is why this is kept as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Identity must not be empty")]
    Empty,
}

/// A creator identity as supplied by the wallet/session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create an identity from its public account string.
    ///
    /// Surrounding whitespace is dropped; the original casing is kept for
    /// display.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identity as originally supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for storage keys and ownership comparisons.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Key-derivation and commitment secret (see module docs).
    pub fn secret(&self) -> String {
        self.normalized()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Identity {}

impl std::hash::Hash for Identity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality_ignores_case() {
        let mixed = Identity::new("0xAbC").unwrap();
        let lower = Identity::new("0xabc").unwrap();
        assert_eq!(mixed, lower);
        assert_eq!(mixed.as_str(), "0xAbC");

        let mut set = HashSet::new();
        set.insert(mixed);
        assert!(set.contains(&lower));
    }

    #[test]
    fn test_secret_is_lower_cased() {
        let identity = Identity::new("0xDEADbeef").unwrap();
        assert_eq!(identity.secret(), "0xdeadbeef");
    }

    #[test]
    fn test_empty_identity_rejected() {
        assert_eq!(Identity::new("   "), Err(IdentityError::Empty));
        assert!("".parse::<Identity>().is_err());
    }

    #[test]
    fn test_whitespace_trimmed() {
        let identity = Identity::new("  0xabc\n").unwrap();
        assert_eq!(identity.as_str(), "0xabc");
    }
}
