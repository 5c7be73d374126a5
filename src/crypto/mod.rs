//! Cryptographic primitives for storyproof
//!
//! This module implements:
//! - PBKDF2-derived AES-256-GCM encryption of file bytes before upload
//!
//! Content addressing (SHA-256) lives in `hashing`.
pub mod encryptor;

#[cfg(test)]
mod proptests;

pub use encryptor::{decrypt, encrypt, CryptoError, DerivedKey, EncryptedBlob, IV_LEN, TAG_LEN};
