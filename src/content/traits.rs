//! Trait abstraction for the external content network.
//!
//! The content network (an IPFS pinning service or similar) is optional.
//! When none is configured the [`super::ContentStore`] keeps blobs locally.

use async_trait::async_trait;
use thiserror::Error;

use crate::kv::KvError;

/// Content-store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network backend unreachable, rejected the request, or not configured.
    /// Always recoverable through the local fallback.
    #[error("Content network unavailable: {0}")]
    Unavailable(String),

    /// Local persistence failed.
    #[error("Local blob store failed: {0}")]
    Local(#[from] KvError),
}

/// External content-addressed network.
#[async_trait]
pub trait ContentNetwork: Send + Sync {
    /// Upload `bytes` under a display `name` and return the network's
    /// identifier for them.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Fetch bytes by identifier. `Ok(None)` means the network answered and
    /// does not have them.
    async fn get(&self, cid: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
