// PageShade Settings Store
// Reads and writes the theme record through a host key-value store, merges
// defaults on install/upgrade, and folds change diffs into full records.

use std::future::Future;
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::types::errors::StoreError;
use crate::types::settings::{ThemeSettings, SETTINGS_KEYS};
use crate::types::storage::{StorageArea, StorageChange};

/// A persistent key-value store provided by the host.
///
/// Each `set` is atomic from the caller's point of view and announces the
/// keys it changed to every subscriber.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the stored items for `keys`, or every item when `keys` is `None`.
    /// Missing keys are absent from the result.
    fn get(
        &self,
        keys: Option<&[&str]>,
    ) -> impl Future<Output = Result<Map<String, Value>, StoreError>> + Send;

    /// Writes all `items`.
    fn set(&self, items: Map<String, Value>) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;

    /// The storage area this store writes to.
    fn area(&self) -> StorageArea;
}

/// Typed access to the [`ThemeSettings`] record.
pub struct SettingsStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> Clone for SettingsStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying key-value store.
    pub fn backend(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetches the record, filling missing fields with defaults.
    pub async fn get_all(&self) -> Result<ThemeSettings, StoreError> {
        let items = self.store.get(Some(&SETTINGS_KEYS[..])).await?;
        Ok(ThemeSettings::from_items(&items))
    }

    /// Like [`get_all`](Self::get_all) but never fails: store errors are
    /// logged and the defaults are returned.
    pub async fn get_all_or_default(&self) -> ThemeSettings {
        match self.get_all().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("Error loading settings, using defaults: {}", e);
                ThemeSettings::default()
            }
        }
    }

    /// Persists every field of `settings` in one write.
    pub async fn set_all(&self, settings: &ThemeSettings) -> Result<(), StoreError> {
        self.store.set(settings.to_items()).await
    }

    /// Writes the full default record. Used on first install.
    pub async fn install_defaults(&self) -> Result<(), StoreError> {
        self.set_all(&ThemeSettings::default()).await
    }

    /// Backfills fields introduced since the stored record was written.
    ///
    /// Stored values win over defaults key by key; keys the record does not
    /// know about are written back untouched.
    pub async fn upgrade_merge(&self) -> Result<ThemeSettings, StoreError> {
        let existing = self.store.get(None).await?;
        let mut merged = ThemeSettings::default().to_items();
        for (key, value) in existing {
            merged.insert(key, value);
        }
        let settings = ThemeSettings::from_items(&merged);
        self.store.set(merged).await?;
        Ok(settings)
    }

    /// Starts watching for external changes, seeded with `initial`.
    pub fn watch(&self, initial: ThemeSettings) -> SettingsWatcher<S> {
        SettingsWatcher {
            receiver: self.store.subscribe(),
            current: initial,
            store: Arc::downgrade(&self.store),
        }
    }
}

/// Follows store change notifications and keeps the last-known full record.
///
/// Holds only a weak handle on the store, so dropping the store still ends
/// the watch.
pub struct SettingsWatcher<S: KeyValueStore> {
    receiver: broadcast::Receiver<StorageChange>,
    current: ThemeSettings,
    store: Weak<S>,
}

impl<S: KeyValueStore> SettingsWatcher<S> {
    /// The last-known record.
    pub fn current(&self) -> &ThemeSettings {
        &self.current
    }

    /// Replaces the last-known record, e.g. after an explicit apply message.
    pub fn reset(&mut self, settings: ThemeSettings) {
        self.current = settings;
    }

    /// Merges a change diff into the last-known record.
    ///
    /// Returns the merged record, or `None` when the change came from another
    /// storage area or touched no settings key.
    pub fn apply_change(&mut self, change: &StorageChange) -> Option<ThemeSettings> {
        if change.area != StorageArea::Sync {
            return None;
        }
        if self.current.merge_items(&change.new_values()) == 0 {
            return None;
        }
        Some(self.current.clone())
    }

    /// Waits for the next change that affects the record.
    ///
    /// Diffs dropped because the watcher fell behind cannot be replayed, so
    /// after a lag the full record is read back from the store instead.
    /// Returns `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<ThemeSettings> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => {
                    if let Some(settings) = self.apply_change(&change) {
                        return Some(settings);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Settings watcher lagged, {} changes skipped; reloading", skipped);
                    if let Some(settings) = self.resync().await {
                        return Some(settings);
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Drops the backlog and reloads the record.
    ///
    /// Resubscribes before reading, so every write after the read is still
    /// delivered. Returns `None` and keeps the last-known record when the
    /// read fails; a dropped store surfaces as `Closed` on the next receive.
    async fn resync(&mut self) -> Option<ThemeSettings> {
        self.receiver = self.receiver.resubscribe();
        let store = SettingsStore::new(self.store.upgrade()?);
        match store.get_all().await {
            Ok(settings) => {
                self.current = settings.clone();
                Some(settings)
            }
            Err(e) => {
                tracing::error!("Error reloading settings after lag: {}", e);
                None
            }
        }
    }
}
