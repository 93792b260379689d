// PageShade Background Worker
// Seeds the settings on install, backfills new fields on upgrade, and
// answers settings queries from the popup.

use crate::services::settings_store::{KeyValueStore, SettingsStore};
use crate::types::message::{Request, Response};
use crate::types::storage::InstallReason;

/// The extension's background context.
pub struct BackgroundWorker<S: KeyValueStore> {
    store: SettingsStore<S>,
}

impl<S: KeyValueStore> BackgroundWorker<S> {
    pub fn new(store: SettingsStore<S>) -> Self {
        Self { store }
    }

    /// Install hook. Failures are logged; the extension keeps running on
    /// whatever the store holds.
    pub async fn on_installed(&self, reason: InstallReason) {
        match reason {
            InstallReason::Install => match self.store.install_defaults().await {
                Ok(()) => tracing::info!("PageShade installed with default settings"),
                Err(e) => tracing::error!("Error setting default settings: {}", e),
            },
            InstallReason::Update { previous_version } => match self.store.upgrade_merge().await {
                Ok(_) => tracing::info!(
                    "Extension updated from {} to version {}",
                    previous_version.as_deref().unwrap_or("unknown"),
                    env!("CARGO_PKG_VERSION")
                ),
                Err(e) => tracing::error!("Error updating settings: {}", e),
            },
            InstallReason::BrowserUpdate => {}
        }
    }

    /// Answers a query from the popup.
    pub async fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::GetSettings => match self.store.get_all().await {
                Ok(settings) => Response::Settings { settings },
                Err(e) => {
                    tracing::error!("Error reading settings for query: {}", e);
                    Response::Error {
                        error: e.to_string(),
                    }
                }
            },
            other => Response::failure(format!(
                "'{}' is not handled by the background worker",
                other.action()
            )),
        }
    }
}
