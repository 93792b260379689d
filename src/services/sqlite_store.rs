//! Persistent key-value store backed by SQLite.
//!
//! Each item is one row in `storage_items`, with its value stored as JSON
//! text. Writes happen in a single transaction and the resulting change is
//! broadcast after commit.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::database::Database;
use crate::services::settings_store::KeyValueStore;
use crate::types::errors::StoreError;
use crate::types::storage::{StorageArea, StorageChange};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Key-value store persisted in a SQLite database.
///
/// Queries run on tokio's blocking pool so a slow disk never stalls the
/// tasks serving pages.
pub struct SqliteStore {
    area: StorageArea,
    db: Arc<Mutex<Database>>,
    changes: broadcast::Sender<StorageChange>,
}

impl SqliteStore {
    /// Opens (or creates) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P, area: StorageArea) -> Result<Self, StoreError> {
        let db = Database::open(path)?;
        Ok(Self::with_database(db, area))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory(area: StorageArea) -> Result<Self, StoreError> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(db, area))
    }

    fn with_database(db: Database, area: StorageArea) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            area,
            db: Arc::new(Mutex::new(db)),
            changes,
        }
    }

    /// Runs `query` against the database off the async executor.
    async fn with_db<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut db = db
                .lock()
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            query(&mut db)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store query did not finish: {}", e)))?
    }
}

fn read_items(
    db: &Database,
    area: StorageArea,
    keys: Option<&[String]>,
) -> Result<Map<String, Value>, StoreError> {
    let mut items = Map::new();
    for (key, raw) in db.load_area(area.as_str())? {
        if keys.is_some_and(|keys| !keys.contains(&key)) {
            continue;
        }
        items.insert(key, serde_json::from_str(&raw)?);
    }
    Ok(items)
}

fn write_items(
    db: &mut Database,
    area: StorageArea,
    updates: &Map<String, Value>,
) -> Result<Option<StorageChange>, StoreError> {
    let encoded = updates
        .iter()
        .map(|(key, value)| Ok((key.as_str(), serde_json::to_string(value)?)))
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    let previous = db.store_rows(area.as_str(), &encoded)?;

    let mut current = Map::new();
    for ((key, _), before) in encoded.iter().zip(previous) {
        if let Some(raw) = before {
            current.insert((*key).to_string(), serde_json::from_str(&raw)?);
        }
    }
    Ok(StorageChange::between(area, &current, updates))
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: Option<&[&str]>) -> Result<Map<String, Value>, StoreError> {
        let area = self.area;
        let keys: Option<Vec<String>> = keys.map(|keys| keys.iter().map(|k| k.to_string()).collect());
        self.with_db(move |db| read_items(db, area, keys.as_deref()))
            .await
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), StoreError> {
        let area = self.area;
        let change = self
            .with_db(move |db| write_items(db, area, &items))
            .await?;
        if let Some(change) = change {
            tracing::debug!(
                "Stored {} changed item(s) in {} area",
                change.changes.len(),
                self.area.as_str()
            );
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
