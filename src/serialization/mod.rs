//! CBOR encoding for fallback-tier records.
//!
//! Checkpoints, claims, licences and stored files are persisted in the local
//! key-value store as CBOR via `ciborium`. Struct fields are written in
//! declaration order, so a record's encoding lists its attributes in the same
//! order as the type that defines it. Lists (a history, a claim set) are CBOR
//! arrays stored under a single key.
//!
//! New optional fields must carry `#[serde(default)]` so records written by
//! older builds keep decoding.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Encode one record.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Decode one record.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}

/// Decode a stored list. A missing key is an empty list.
pub fn decode_list<T: DeserializeOwned>(
    bytes: Option<&[u8]>,
) -> Result<Vec<T>, SerializationError> {
    match bytes {
        None => Ok(Vec::new()),
        Some(bytes) => from_cbor(bytes),
    }
}
