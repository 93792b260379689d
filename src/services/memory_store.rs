//! In-memory key-value store standing in for the browser's sync storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::services::settings_store::KeyValueStore;
use crate::types::errors::StoreError;
use crate::types::storage::{StorageArea, StorageChange};

/// Capacity of the change broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Volatile store with change broadcasting.
///
/// Can be switched offline to simulate the host storage failing.
pub struct MemoryStore {
    area: StorageArea,
    items: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new(area: StorageArea) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            area,
            items: Mutex::new(Map::new()),
            changes,
            available: AtomicBool::new(true),
        }
    }

    /// Marks the store as reachable or not. While unreachable every call fails
    /// with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "{} storage is not reachable",
                self.area.as_str()
            )))
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: Option<&[&str]>) -> Result<Map<String, Value>, StoreError> {
        self.check_available()?;
        let items = self
            .items
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let result = match keys {
            None => items.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|key| items.get(*key).map(|v| (key.to_string(), v.clone())))
                .collect(),
        };
        Ok(result)
    }

    async fn set(&self, updates: Map<String, Value>) -> Result<(), StoreError> {
        self.check_available()?;
        let change = {
            let mut items = self
                .items
                .lock()
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let change = StorageChange::between(self.area, &items, &updates);
            items.extend(updates);
            change
        };
        if let Some(change) = change {
            // No subscribers is fine.
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }

    fn area(&self) -> StorageArea {
        self.area
    }
}
