//! Nullable store: thread-safe in-memory snapshot storage for testing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use ubi_store::{LedgerStore, StoreError};

/// An in-memory [`LedgerStore`].
#[derive(Default)]
pub struct NullStore {
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Vec<u8>, Vec<u8>>> {
        self.meta.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl LedgerStore for NullStore {
    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.lock().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete_meta(&self, key: &[u8]) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}
