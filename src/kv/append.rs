//! Append-only record lists with serialized writers.
//!
//! Histories and claim sets are stored as one CBOR array per key, so adding
//! an entry is a read-modify-write of the whole list. Two layers keep that
//! from losing entries:
//!
//! 1. a per-key async writer lock serializes writers inside this process;
//! 2. the write itself is a compare-and-swap against the bytes that were
//!    read, so a writer in another process sharing the store forces a re-read
//!    instead of being overwritten.
//!
//! A cancelled append either swapped the list or did not. There is no
//! partially written state.

use super::{KeyValueStore, KvError};
use crate::serialization::{decode_list, to_cbor};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Compare-and-swap attempts before reporting contention.
const MAX_SWAP_ATTEMPTS: u32 = 16;

/// Typed append-only lists over a [`KeyValueStore`].
pub struct AppendLog<T> {
    store: Arc<dyn KeyValueStore>,
    writers: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> AppendLog<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writers: Mutex::new(HashMap::new()),
            _record: PhantomData,
        }
    }

    fn writer(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut writers = self.writers.lock().unwrap();
        writers
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// All records under `key`, oldest first.
    pub async fn read(&self, key: &str) -> Result<Vec<T>, KvError> {
        let bytes = self.store.get(key).await?;
        Ok(decode_list(bytes.as_deref())?)
    }

    /// Append `record` and return the new list length.
    pub async fn append(&self, key: &str, record: T) -> Result<usize, KvError> {
        let (len, _) = self.append_with(key, |_| record.clone()).await?;
        Ok(len)
    }

    /// Append the record `build` makes from the current list, and return the
    /// new length with the record as stored.
    ///
    /// `build` runs inside the writer lock and again after every lost swap,
    /// so it always sees the list the record is appended to.
    pub async fn append_with<F>(&self, key: &str, build: F) -> Result<(usize, T), KvError>
    where
        F: Fn(&[T]) -> T,
    {
        let writer = self.writer(key);
        let result = {
            let _guard = writer.lock().await;
            self.swap_in(key, &build).await
        };
        self.release(key, writer);
        result
    }

    async fn swap_in<F>(&self, key: &str, build: &F) -> Result<(usize, T), KvError>
    where
        F: Fn(&[T]) -> T,
    {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self.store.get(key).await?;
            let mut records: Vec<T> = decode_list(current.as_deref())?;
            let record = build(&records);
            records.push(record.clone());
            let encoded = to_cbor(&records)?;

            if self
                .store
                .compare_and_swap(key, current.as_deref(), &encoded)
                .await?
            {
                return Ok((records.len(), record));
            }
            debug!(key, attempt, "list changed underneath append, re-reading");
        }

        Err(KvError::Contention(key.to_string()))
    }

    /// Forget the writer lock for `key` once nobody else holds or awaits it.
    fn release(&self, key: &str, writer: Arc<tokio::sync::Mutex<()>>) {
        let mut writers = self.writers.lock().unwrap();
        // One reference in the map, one in `writer`.
        let idle = Arc::strong_count(&writer) == 2;
        drop(writer);
        if idle {
            writers.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked_writers(&self) -> usize {
        self.writers.lock().unwrap().len()
    }

    /// Drop every record under `key`.
    pub async fn clear(&self, key: &str) -> Result<(), KvError> {
        let writer = self.writer(key);
        let result = {
            let _guard = writer.lock().await;
            self.store.remove(key).await
        };
        self.release(key, writer);
        result
    }
}
