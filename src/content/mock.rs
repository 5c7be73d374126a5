//! Mock content network for testing.

use super::traits::{ContentNetwork, StoreError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory content network. Identifiers are derived from the bytes, so
/// identical uploads map to the same identifier like a real CAS would.
#[derive(Clone, Default)]
pub struct MockContentNetwork {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    blobs: HashMap<String, Vec<u8>>,
    offline: bool,
    puts: usize,
}

impl MockContentNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the network going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Successful uploads so far.
    pub fn put_count(&self) -> usize {
        self.state.lock().unwrap().puts
    }
}

#[async_trait]
impl ContentNetwork for MockContentNetwork {
    async fn put(&self, _name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(StoreError::Unavailable("mock network offline".to_string()));
        }
        let cid = format!("bafy{}", hex::encode(&Sha256::digest(bytes)[..20]));
        state.blobs.insert(cid.clone(), bytes.to_vec());
        state.puts += 1;
        Ok(cid)
    }

    async fn get(&self, cid: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(StoreError::Unavailable("mock network offline".to_string()));
        }
        Ok(state.blobs.get(cid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_put_and_get() {
        let network = MockContentNetwork::new();
        let cid = network.put("a.txt", b"bytes").await.unwrap();
        assert!(cid.starts_with("bafy"));
        assert_eq!(network.get(&cid).await.unwrap(), Some(b"bytes".to_vec()));
        assert_eq!(network.put_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_offline() {
        let network = MockContentNetwork::new();
        network.set_offline(true);
        assert!(matches!(
            network.put("a.txt", b"bytes").await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(network.put_count(), 0);
    }
}
