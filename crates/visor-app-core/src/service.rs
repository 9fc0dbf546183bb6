// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Preference service: startup defaults + snapshot merge, live access,
//! best-effort persistence on demand or on lifecycle signal.

use crate::defaults::{default_language, detected_timezone, DetectError};
use crate::lifecycle::LifecycleEvent;
use crate::prefs::Preferences;
use crate::storage::{LocalStore, StoreError};
use serde_json::{Map, Value};
use tracing::warn;

/// Storage key of the preference snapshot within the durable store.
pub const STORAGE_KEY: &str = "GUAC_PREFERENCES";

/// Two-phase builder for [`PrefService`].
///
/// Assemble the configuration first (store, optional fixed defaults), then
/// call [`build`](Self::build) to perform the one-time snapshot read and
/// merge. Embedders and tests supply `language`/`timezone` overrides to
/// bypass environment detection.
pub struct PrefServiceBuilder<S> {
    store: S,
    language: Option<String>,
    timezone: Option<String>,
}

impl<S> PrefServiceBuilder<S> {
    /// Start configuring a service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            language: None,
            timezone: None,
        }
    }

    /// Use a fixed default language instead of detecting one.
    pub fn language(mut self, tag: impl Into<String>) -> Self {
        self.language = Some(tag.into());
        self
    }

    /// Use a fixed default timezone instead of detecting one.
    pub fn timezone(mut self, zone: impl Into<String>) -> Self {
        self.timezone = Some(zone.into());
        self
    }
}

impl<S: LocalStore> PrefServiceBuilder<S> {
    /// Resolve defaults, overlay any persisted snapshot, and return the
    /// ready-to-use service.
    ///
    /// A missing or unreadable snapshot is not an error; the defaults are
    /// used in full. Timezone detection failure is fatal, and can only
    /// occur when no `timezone` override was configured.
    pub fn build(self) -> Result<PrefService<S>, DetectError> {
        let language = self.language.unwrap_or_else(default_language);
        let timezone = match self.timezone {
            Some(zone) => zone,
            None => detected_timezone()?,
        };

        let defaults = Preferences::seeded(language, timezone);
        let preferences = match load_snapshot(&self.store) {
            Some(snapshot) => match defaults.overlaid(snapshot) {
                Ok(merged) => merged,
                Err(err) => {
                    warn!("persisted preferences unusable, using defaults: {err}");
                    defaults
                }
            },
            None => defaults,
        };

        Ok(PrefService {
            store: self.store,
            preferences,
        })
    }
}

/// Read the persisted snapshot, treating every failure as "no snapshot".
fn load_snapshot<S: LocalStore>(store: &S) -> Option<Map<String, Value>> {
    let bytes = match store.load_raw(STORAGE_KEY) {
        Ok(bytes) => bytes,
        Err(StoreError::NotFound) => return None,
        Err(err) => {
            warn!("failed to read persisted preferences: {err}");
            return None;
        }
    };
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!("persisted preferences are not a JSON object, ignoring");
            None
        }
        Err(err) => {
            warn!("failed to parse persisted preferences: {err}");
            None
        }
    }
}

/// Owns the live preference mapping for the duration of a session.
///
/// Construction (via [`PrefServiceBuilder`]) seeds environment defaults
/// and overlays the persisted snapshot exactly once; afterwards the store
/// is write-only and persistence happens only at [`save`](Self::save)
/// time. Individual mutations are never intercepted.
pub struct PrefService<S> {
    store: S,
    preferences: Preferences,
}

impl<S> PrefService<S> {
    /// Start building a service over the given store.
    pub fn builder(store: S) -> PrefServiceBuilder<S> {
        PrefServiceBuilder::new(store)
    }

    /// The live preference mapping.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Mutable access to the live mapping. Mutations take effect
    /// immediately in memory but are not persisted until the next
    /// [`save`](Self::save).
    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Consume the service and return the inner store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: LocalStore> PrefService<S> {
    /// Persist the current mapping under [`STORAGE_KEY`], unconditionally
    /// overwriting any prior snapshot.
    ///
    /// Best-effort: a failed write is logged and swallowed, never surfaced
    /// to the caller. No partial writes, no diffing, no retry.
    pub fn save(&self) {
        let data = match serde_json::to_vec_pretty(&self.preferences) {
            Ok(data) => data,
            Err(err) => {
                warn!("failed to encode preferences: {err}");
                return;
            }
        };
        if let Err(err) = self.store.save_raw(STORAGE_KEY, &data) {
            warn!("failed to persist preferences: {err}");
        }
    }

    /// React to a lifecycle signal from the embedding application.
    ///
    /// Edge-triggered: every signal invokes exactly one [`save`](Self::save),
    /// with no debouncing or coalescing. Rapid repeats overwrite the same
    /// key; last write wins.
    pub fn handle_lifecycle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Unload
            | LifecycleEvent::NavigationCompleted
            | LifecycleEvent::Logout => self.save(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Minimal store for in-crate tests; the shared fake lives in
    /// visor-dry-tests.
    #[derive(Default)]
    struct MapStore {
        data: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MapStore {
        fn with_snapshot(json: &str) -> Self {
            let store = Self::default();
            store
                .data
                .borrow_mut()
                .insert(STORAGE_KEY.to_string(), json.as_bytes().to_vec());
            store
        }
    }

    impl LocalStore for MapStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            self.data
                .borrow()
                .get(key)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
            self.data
                .borrow_mut()
                .insert(key.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn build(store: MapStore) -> PrefService<MapStore> {
        PrefService::builder(store)
            .language("en_US")
            .timezone("America/New_York")
            .build()
            .unwrap()
    }

    #[test]
    fn fresh_store_yields_seeded_defaults() {
        let svc = build(MapStore::default());
        let prefs = svc.preferences();
        assert!(prefs.emulate_absolute_mouse);
        assert_eq!(prefs.input_method, crate::prefs::input_methods::NONE);
        assert_eq!(prefs.language, "en_US");
        assert_eq!(prefs.timezone, "America/New_York");
        assert!(prefs.extra.is_empty());
    }

    #[test]
    fn snapshot_overlays_defaults() {
        let svc = build(MapStore::with_snapshot(r#"{"inputMethod":"osk"}"#));
        assert_eq!(svc.preferences().input_method, "osk");
        assert_eq!(svc.preferences().language, "en_US");
    }

    #[test]
    fn unparsable_snapshot_is_ignored() {
        let svc = build(MapStore::with_snapshot("not json"));
        assert_eq!(svc.preferences().input_method, "none");
    }

    #[test]
    fn empty_snapshot_is_ignored() {
        let svc = build(MapStore::with_snapshot(""));
        assert_eq!(svc.preferences().language, "en_US");
    }

    #[test]
    fn save_writes_the_full_mapping_under_the_fixed_key() {
        let mut svc = build(MapStore::default());
        svc.preferences_mut().language = "fr".to_string();
        svc.save();
        let store = svc.into_store();
        let bytes = store.load_raw(STORAGE_KEY).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value.get("language"), Some(&Value::String("fr".into())));
        assert!(value.get("emulateAbsoluteMouse").is_some());
    }
}
