use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage area a change originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    Sync,
    Local,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

/// Old and new value of one key. `None` means the key was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// A batch of key changes produced by a single store write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageChange {
    pub area: StorageArea,
    pub changes: HashMap<String, ValueChange>,
}

/// Why the extension's install hook is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update { previous_version: Option<String> },
    BrowserUpdate,
}

impl StorageChange {
    /// Computes the change produced by writing `updates` over `current`.
    ///
    /// Keys whose value is unchanged are left out; returns `None` when
    /// nothing changed.
    pub fn between(
        area: StorageArea,
        current: &serde_json::Map<String, Value>,
        updates: &serde_json::Map<String, Value>,
    ) -> Option<Self> {
        let changes: HashMap<String, ValueChange> = updates
            .iter()
            .filter(|(key, value)| current.get(*key) != Some(*value))
            .map(|(key, value)| {
                (
                    key.clone(),
                    ValueChange {
                        old_value: current.get(key).cloned(),
                        new_value: Some(value.clone()),
                    },
                )
            })
            .collect();
        if changes.is_empty() {
            None
        } else {
            Some(Self { area, changes })
        }
    }

    /// The new values carried by this change, keyed by name.
    ///
    /// Removed keys map to `null` so consumers fall back to defaults.
    pub fn new_values(&self) -> serde_json::Map<String, Value> {
        self.changes
            .iter()
            .map(|(key, change)| (key.clone(), change.new_value.clone().unwrap_or(Value::Null)))
            .collect()
    }
}
