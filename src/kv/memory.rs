//! In-memory key-value store.

use super::{KeyValueStore, KvError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Map-backed [`KeyValueStore`]. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (for exercising I/O failure paths).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Backend("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, KvError> {
        self.check_writable()?;
        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), new.to_vec());
        Ok(true)
    }
}
