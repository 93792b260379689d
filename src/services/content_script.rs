//! Content Script — keeps one page's theme in step with the settings.
//!
//! A [`ContentSession`] owns the page's theme state. [`run_content_script`]
//! drives it from two event sources: command messages from the popup and
//! change notifications from the settings store.

use tokio::sync::mpsc;

use crate::services::message_router::Envelope;
use crate::services::settings_store::{KeyValueStore, SettingsStore};
use crate::services::style_applicator::{compute_style, DocumentRoot, StyleApplicator};
use crate::types::message::{Request, Response};
use crate::types::settings::ThemeSettings;
use crate::types::style::ThemeState;

/// Theme state of a single page.
pub struct ContentSession<D: DocumentRoot> {
    applicator: StyleApplicator<D>,
    current_settings: Option<ThemeSettings>,
    theme_enabled: bool,
}

impl<D: DocumentRoot> ContentSession<D> {
    /// Starts a session on `root`, capturing its inline style before any change.
    pub fn new(root: D) -> Self {
        Self {
            applicator: StyleApplicator::new(root),
            current_settings: None,
            theme_enabled: true,
        }
    }

    /// Settings last loaded or received; `None` until the first load.
    pub fn current_settings(&self) -> Option<&ThemeSettings> {
        self.current_settings.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.theme_enabled
    }

    /// Whether the theme is currently applied to the page.
    pub fn state(&self) -> ThemeState {
        self.applicator.state()
    }

    pub fn document(&self) -> &D {
        self.applicator.root()
    }

    /// Makes `settings` the cached record and applies or reverts to match.
    pub fn sync_to(&mut self, settings: ThemeSettings) {
        if settings.enabled {
            self.applicator.apply(&compute_style(&settings));
        } else {
            self.applicator.revert();
        }
        self.theme_enabled = settings.enabled;
        self.current_settings = Some(settings);
    }

    /// Takes the theme off the page as it goes away, leaving the document
    /// with its own inline style.
    pub fn unload(&mut self) {
        self.applicator.revert();
    }

    /// Flips the theme without changing the cached settings.
    ///
    /// Turning on before any settings were loaded applies the defaults.
    pub fn toggle(&mut self) -> bool {
        if self.theme_enabled {
            self.applicator.revert();
            self.theme_enabled = false;
        } else {
            let settings = self.current_settings.clone().unwrap_or_default();
            self.applicator.apply(&compute_style(&settings));
            self.theme_enabled = true;
        }
        self.theme_enabled
    }

    /// Answers a command message. Every request gets a response.
    pub fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::ApplySettings { settings } => {
                self.sync_to(settings);
                Response::ok()
            }
            Request::ToggleTheme => {
                let enabled = self.toggle();
                tracing::debug!("Theme toggled, enabled = {}", enabled);
                Response::Toggled {
                    success: true,
                    enabled,
                }
            }
            Request::GetStatus => Response::Status {
                enabled: self.theme_enabled,
                settings: self.current_settings.clone(),
            },
            other => Response::failure(format!(
                "'{}' is not handled by the content script",
                other.action()
            )),
        }
    }
}

/// Runs a page's content script until its inbox closes.
///
/// Loads the stored settings, then serves commands and store changes one at a
/// time. Returns the session so callers can inspect the final state.
pub async fn run_content_script<S, D>(
    mut session: ContentSession<D>,
    store: SettingsStore<S>,
    mut inbox: mpsc::Receiver<Envelope>,
) -> ContentSession<D>
where
    S: KeyValueStore,
    D: DocumentRoot,
{
    // Subscribe before loading so no change between the two is lost.
    let mut watcher = store.watch(ThemeSettings::default());
    let settings = store.get_all_or_default().await;
    watcher.reset(settings.clone());
    session.sync_to(settings);

    let mut store_open = true;
    loop {
        tokio::select! {
            // Changes already queued happened before any queued command.
            biased;

            changed = watcher.next(), if store_open => {
                match changed {
                    Some(settings) => session.sync_to(settings),
                    None => {
                        tracing::warn!("Settings store closed, no more live updates");
                        store_open = false;
                    }
                }
            }
            envelope = inbox.recv() => {
                let Some(envelope) = envelope else { break };
                let response = session.handle_request(envelope.request.clone());
                if let Some(settings) = session.current_settings() {
                    watcher.reset(settings.clone());
                }
                envelope.respond(response);
            }
        }
    }
    session
}
