// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory local store fake for testing without filesystem I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use visor_app_core::storage::{LocalStore, StoreError};

/// In-memory implementation of [`LocalStore`] for testing.
///
/// This fake allows tests to verify preference save/load behavior without
/// touching the filesystem. It tracks call counts, records every
/// successful save in call order, and can be told to fail on demand.
///
/// # Example
///
/// ```
/// use visor_dry_tests::InMemoryStore;
/// use visor_app_core::storage::LocalStore;
///
/// let store = InMemoryStore::new();
/// store.save_raw("prefs", b"{}").unwrap();
/// assert_eq!(store.save_count(), 1);
/// assert_eq!(store.load_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    data: HashMap<String, Vec<u8>>,
    history: Vec<(String, Vec<u8>)>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given key-value pairs.
    pub fn with_data(data: HashMap<String, Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStoreInner {
                data,
                ..Default::default()
            })),
        }
    }

    /// Create a store holding `value` as the JSON blob for `key`.
    pub fn with_json(key: &str, value: &serde_json::Value) -> Self {
        let mut data = HashMap::new();
        data.insert(key.to_string(), value.to_string().into_bytes());
        Self::with_data(data)
    }

    /// Configure the store to fail on load operations.
    pub fn set_fail_on_load(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.fail_on_load = fail;
    }

    /// Configure the store to fail on save operations.
    pub fn set_fail_on_save(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.fail_on_save = fail;
    }

    /// Number of times `load_raw` was attempted, including failed
    /// attempts and missing keys.
    pub fn load_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .load_count
    }

    /// Number of times `save_raw` was attempted, including attempts that
    /// fail due to `set_fail_on_save(true)`.
    pub fn save_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .save_count
    }

    /// Every successful save as `(key, blob)`, in call order.
    ///
    /// Lets tests assert not just how many writes happened but what each
    /// one contained at the moment it fired.
    pub fn saved_history(&self) -> Vec<(String, Vec<u8>)> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }

    /// Current blob for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .data
            .get(key)
            .cloned()
    }

    /// Check if a key exists in the store.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .data
            .contains_key(key)
    }
}

impl LocalStore for InMemoryStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.load_count += 1;

        if inner.fail_on_load {
            return Err(StoreError::Other("simulated load failure".into()));
        }

        inner.data.get(key).cloned().ok_or(StoreError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.save_count += 1;

        if inner.fail_on_save {
            return Err(StoreError::Other("simulated save failure".into()));
        }

        inner.data.insert(key.to_string(), data.to_vec());
        inner.history.push((key.to_string(), data.to_vec()));
        Ok(())
    }
}
