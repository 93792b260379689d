//! Host configuration.
//!
//! Values come from environment variables, falling back to platform defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::platform;
use crate::services::message_router::DEFAULT_RESPONSE_TIMEOUT;

/// Overrides the directory holding the persistent store.
pub const DATA_DIR_VAR: &str = "PAGESHADE_DATA_DIR";
/// Overrides how long senders wait for a content script reply, in milliseconds.
pub const RESPONSE_TIMEOUT_VAR: &str = "PAGESHADE_RESPONSE_TIMEOUT_MS";

const DATABASE_FILE: &str = "pageshade.db";

/// Settings of the native extension host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub data_dir: PathBuf,
    pub response_timeout: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::get_data_dir(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl HostConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(RESPONSE_TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.response_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    "Ignoring {}={:?}, expected a positive number of milliseconds",
                    RESPONSE_TIMEOUT_VAR,
                    raw
                ),
            }
        }

        config
    }

    /// Location of the SQLite store file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
