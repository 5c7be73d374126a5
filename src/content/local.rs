//! Local fallback blob store.
//!
//! Used when no content network is configured or an upload to it fails. The
//! locators it issues look like IPFS v0 CIDs (`Qm` + 42 characters) but are
//! random tokens, and only this store can resolve them.

use super::traits::StoreError;
use crate::kv::{keys, KeyValueStore};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

/// Characters after the `Qm` prefix.
const TOKEN_LEN: usize = 42;

/// Attempts at finding an unused token before giving up.
const MAX_TOKEN_ATTEMPTS: u32 = 8;

#[derive(Clone)]
pub struct LocalBlobStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalBlobStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Store `bytes` under a fresh locally unique token and return it.
    pub async fn put(&self, bytes: &[u8]) -> Result<String, StoreError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token();
            // Insert-if-absent, so a token is never handed out twice.
            if self
                .kv
                .compare_and_swap(&keys::blob(&token), None, bytes)
                .await?
            {
                return Ok(token);
            }
        }
        Err(StoreError::Unavailable(
            "could not allocate a unique local locator".to_string(),
        ))
    }

    /// Forget a blob this store issued.
    pub async fn remove(&self, token: &str) -> Result<(), StoreError> {
        Ok(self.kv.remove(&keys::blob(token)).await?)
    }

    /// Fetch bytes for a token this store issued.
    pub async fn get(&self, token: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.kv.get(&keys::blob(token)).await?)
    }
}

fn generate_token() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("Qm{}", suffix)
}
