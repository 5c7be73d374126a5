//! Content addressing and commitment hashes.
//!
//! Every file registered with storyproof is identified by the SHA-256 digest
//! of its raw bytes. The same bytes always produce the same address, so two
//! uploads of an identical file share an address even though they produce two
//! separate checkpoints.
//!
//! ```text
//! address    = SHA256(file_bytes)
//! commitment = SHA256(hex(address) || identity_secret)
//! ```
//!
//! The commitment binds an address to an identity without revealing the
//! secret. Checking it requires already knowing the secret, so it is an audit
//! record rather than a capability.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Length of every digest in this module.
pub const DIGEST_LEN: usize = 32;

/// Errors from parsing hex-encoded digests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestParseError {
    #[error("Invalid hex digest: {0}")]
    InvalidHex(String),

    #[error("Invalid digest length: expected {DIGEST_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

fn parse_digest(hex_str: &str) -> Result<[u8; DIGEST_LEN], DigestParseError> {
    let trimmed = hex_str.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(trimmed.to_ascii_lowercase())
        .map_err(|e| DigestParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != DIGEST_LEN {
        return Err(DigestParseError::InvalidLength(bytes.len()));
    }
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// SHA-256 digest of a file's raw bytes.
///
/// Serialized as lower-case hex in every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress([u8; DIGEST_LEN]);

impl ContentAddress {
    /// Wrap an existing digest.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a hex digest. Accepts upper or lower case and an optional `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, DigestParseError> {
        parse_digest(hex_str).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lower-case hex rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Case-insensitive comparison against a hex string.
    ///
    /// Unparseable input never matches.
    pub fn matches_hex(&self, other: &str) -> bool {
        Self::from_hex(other).map(|a| a == *self).unwrap_or(false)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Digest binding a content address to an identity secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentHash([u8; DIGEST_LEN]);

impl CommitmentHash {
    pub fn from_hex(hex_str: &str) -> Result<Self, DigestParseError> {
        parse_digest(hex_str).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = DigestParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentAddress> for String {
    fn from(address: ContentAddress) -> Self {
        address.to_hex()
    }
}

impl TryFrom<String> for CommitmentHash {
    type Error = DigestParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<CommitmentHash> for String {
    fn from(hash: CommitmentHash) -> Self {
        hash.to_hex()
    }
}

/// Compute the content address of `bytes`.
///
/// Empty input is valid and yields the digest of zero bytes.
pub fn digest(bytes: &[u8]) -> ContentAddress {
    ContentAddress(Sha256::digest(bytes).into())
}

/// Compute the commitment for `address` under `secret`.
///
/// The preimage is the hex rendering of the address followed by the secret,
/// both as UTF-8 text.
pub fn commitment(address: &ContentAddress, secret: &str) -> CommitmentHash {
    let mut hasher = Sha256::new();
    hasher.update(address.to_hex().as_bytes());
    hasher.update(secret.as_bytes());
    CommitmentHash(hasher.finalize().into())
}
