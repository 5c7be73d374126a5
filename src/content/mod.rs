//! Content-addressed blob storage.
//!
//! Encrypted blobs are published through a [`ContentStore`], which picks its
//! backend once per call:
//!
//! - **Network**: an attached [`ContentNetwork`] (IPFS pinning service or
//!   similar). Used whenever one is configured.
//! - **Local**: [`LocalBlobStore`] in the key-value store. Used when no network
//!   is configured, and for any upload the network fails.
//!
//! The returned [`ContentLocator`] records which backend holds the blob, so a
//! locally issued token is never mistaken for a resolvable network CID.

pub mod local;
pub mod mock;
pub mod traits;

pub use local::LocalBlobStore;
pub use mock::MockContentNetwork;
pub use traits::{ContentNetwork, StoreError};

use crate::clock::Clock;
use crate::kv::{keys, KeyValueStore, KvError};
use crate::serialization::{from_cbor, to_cbor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where an encrypted blob can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentLocator {
    /// Identifier assigned by the content network.
    Network(String),
    /// Token issued by the local fallback store. Not resolvable elsewhere.
    Local(String),
}

impl ContentLocator {
    pub fn cid(&self) -> &str {
        match self {
            Self::Network(cid) | Self::Local(cid) => cid,
        }
    }

    /// Whether anyone other than this device can fetch the blob.
    pub fn is_resolvable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(cid) => write!(f, "{}", cid),
            Self::Local(cid) => write!(f, "{} (local)", cid),
        }
    }
}

/// Which backend accepted an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    Network,
    Local,
}

/// Upload record kept under `ipfs_<cid>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub file_name: String,
    /// Blob size in bytes (ciphertext, not the original file).
    pub size: u64,
    pub uploaded_at: u64,
    pub provider: Provider,
}

pub struct ContentStore {
    network: Option<Arc<dyn ContentNetwork>>,
    local: LocalBlobStore,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ContentStore {
    /// Store with only the local fallback.
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            network: None,
            local: LocalBlobStore::new(kv.clone()),
            kv,
            clock,
        }
    }

    /// Attach a content network; uploads go there first.
    pub fn with_network(mut self, network: Arc<dyn ContentNetwork>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn has_network(&self) -> bool {
        self.network.is_some()
    }

    /// Publish `blob` and return its locator.
    ///
    /// Network failures are logged and demoted to the local store. Only a
    /// local persistence failure is returned as an error.
    pub async fn put(&self, name: &str, blob: &[u8]) -> Result<ContentLocator, StoreError> {
        let locator = match &self.network {
            Some(network) => match network.put(name, blob).await {
                Ok(cid) => ContentLocator::Network(cid),
                Err(e) => {
                    warn!(error = %e, file = name, "content network upload failed, storing blob locally");
                    ContentLocator::Local(self.local.put(blob).await?)
                }
            },
            None => {
                debug!(file = name, "no content network configured, storing blob locally");
                ContentLocator::Local(self.local.put(blob).await?)
            }
        };

        let metadata = BlobMetadata {
            file_name: name.to_string(),
            size: blob.len() as u64,
            uploaded_at: self.clock.now(),
            provider: match locator {
                ContentLocator::Network(_) => Provider::Network,
                ContentLocator::Local(_) => Provider::Local,
            },
        };
        let recorded = match to_cbor(&metadata) {
            Ok(encoded) => self
                .kv
                .set(&keys::blob_metadata(locator.cid()), &encoded)
                .await
                .map_err(StoreError::from),
            Err(e) => Err(StoreError::from(KvError::from(e))),
        };
        if let Err(e) = recorded {
            // Nothing references the local blob without its metadata.
            if let ContentLocator::Local(token) = &locator {
                if let Err(cleanup) = self.local.remove(token).await {
                    warn!(error = %cleanup, token = %token, "could not remove unreferenced local blob");
                }
            }
            return Err(e);
        }

        Ok(locator)
    }

    /// Fetch a blob. `Ok(None)` means the backend has no such blob.
    ///
    /// A network locator with no network attached is `Unavailable`, not absent.
    pub async fn get(&self, locator: &ContentLocator) -> Result<Option<Vec<u8>>, StoreError> {
        match locator {
            ContentLocator::Local(token) => self.local.get(token).await,
            ContentLocator::Network(cid) => match &self.network {
                Some(network) => network.get(cid).await,
                None => Err(StoreError::Unavailable(
                    "no content network configured".to_string(),
                )),
            },
        }
    }

    /// Upload metadata recorded when `locator` was issued.
    pub async fn metadata(
        &self,
        locator: &ContentLocator,
    ) -> Result<Option<BlobMetadata>, StoreError> {
        match self.kv.get(&keys::blob_metadata(locator.cid())).await? {
            None => Ok(None),
            Some(bytes) => Ok(Some(
                from_cbor(&bytes).map_err(KvError::from)?,
            )),
        }
    }
}
