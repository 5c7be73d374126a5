//! Local key-value storage for the fallback tier.
//!
//! Everything storyproof keeps locally goes through an injected
//! [`KeyValueStore`] rather than ambient global state:
//!
//! | Key                     | Contents                                   |
//! |-------------------------|--------------------------------------------|
//! | `checkpoints_<id>`      | checkpoint history (CBOR array)            |
//! | `ip_assets_<id>`        | ownership claims (CBOR array)              |
//! | `ip_licenses_<id>`      | licences (CBOR array)                      |
//! | `file_<address>`        | plaintext copy of a registered file        |
//! | `blob_<cid>`            | encrypted blob held by the local store     |
//! | `ipfs_<cid>`            | upload metadata for a content locator      |
//!
//! `<id>` is the lower-cased identity, so each identity has its own namespace.
//!
//! Backends:
//! - [`MemoryKvStore`]: in-process map, for tests and embedding
//! - [`SqliteKvStore`]: `storyproof.db` on disk via sqlx

pub mod append;
pub mod memory;
pub mod sqlite;

pub use append::AppendLog;
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use crate::serialization::SerializationError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Record codec error: {0}")]
    Codec(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gave up after repeated concurrent writes to '{0}'")]
    Contention(String),
}

impl From<sqlx::Error> for KvError {
    fn from(err: sqlx::Error) -> Self {
        KvError::Backend(err.to_string())
    }
}

/// Byte-oriented key-value store.
///
/// Implementations must make each single-key operation atomic: a reader
/// sees either the old value or the new one, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    async fn remove(&self, key: &str) -> Result<(), KvError>;

    /// Replace the value at `key` only if it currently equals `expected`
    /// (`None` meaning "absent"). Returns whether the swap happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, KvError>;
}

/// Key builders for the layout in the module docs.
pub mod keys {
    use crate::hashing::ContentAddress;
    use crate::identity::Identity;

    pub fn checkpoints(owner: &Identity) -> String {
        format!("checkpoints_{}", owner.normalized())
    }

    pub fn claims(owner: &Identity) -> String {
        format!("ip_assets_{}", owner.normalized())
    }

    pub fn licenses(owner: &Identity) -> String {
        format!("ip_licenses_{}", owner.normalized())
    }

    pub fn stored_file(address: &ContentAddress) -> String {
        format!("file_{}", address.to_hex())
    }

    pub fn blob(cid: &str) -> String {
        format!("blob_{}", cid)
    }

    pub fn blob_metadata(cid: &str) -> String {
        format!("ipfs_{}", cid)
    }
}
