//! Extension host for PageShade.
//!
//! Wires the three contexts together: one settings store, the background
//! worker, the message router with its tab list, and one content-script task
//! per open page.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::HostConfig;
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::background::BackgroundWorker;
use crate::services::content_script::{run_content_script, ContentSession};
use crate::services::memory_store::MemoryStore;
use crate::services::message_router::MessageRouter;
use crate::services::popup::PopupController;
use crate::services::settings_store::{KeyValueStore, SettingsStore};
use crate::services::sqlite_store::SqliteStore;
use crate::services::style_applicator::{InMemoryDocument, SharedDocument};
use crate::types::errors::{StoreError, TabError};
use crate::types::storage::{InstallReason, StorageArea};

type ContentTask = JoinHandle<ContentSession<SharedDocument>>;

/// A page open in a tab.
struct PageHandle {
    document: SharedDocument,
    task: Option<ContentTask>,
}

/// Central struct holding the store, the contexts and the open pages.
pub struct ExtensionHost<S: KeyValueStore> {
    store: SettingsStore<S>,
    background: BackgroundWorker<S>,
    router: Arc<MessageRouter>,
    pages: HashMap<String, PageHandle>,
}

impl ExtensionHost<SqliteStore> {
    /// Opens the persistent store under `config.data_dir`.
    pub fn open(config: &HostConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            StoreError::Unavailable(format!("{}: {}", config.data_dir.display(), e))
        })?;
        let store = SqliteStore::open(config.database_path(), StorageArea::Sync)?;
        tracing::info!("Settings store at {}", config.database_path().display());
        Ok(Self::new(Arc::new(store), config.response_timeout))
    }
}

impl ExtensionHost<MemoryStore> {
    /// A host whose settings live only as long as the process.
    pub fn in_memory(config: &HostConfig) -> Self {
        Self::new(
            Arc::new(MemoryStore::new(StorageArea::Sync)),
            config.response_timeout,
        )
    }
}

impl<S: KeyValueStore> ExtensionHost<S> {
    pub fn new(backend: Arc<S>, response_timeout: Duration) -> Self {
        let store = SettingsStore::new(backend);
        Self {
            background: BackgroundWorker::new(store.clone()),
            store,
            router: Arc::new(MessageRouter::new(response_timeout)),
            pages: HashMap::new(),
        }
    }

    /// Runs the lifecycle hook for `reason`.
    pub async fn install(&self, reason: InstallReason) {
        self.background.on_installed(reason).await;
    }

    pub fn store(&self) -> &SettingsStore<S> {
        &self.store
    }

    pub fn background(&self) -> &BackgroundWorker<S> {
        &self.background
    }

    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    /// Opens a page with no inline style in a new tab.
    pub fn open_tab(&mut self, url: Option<&str>, active: bool) -> (String, SharedDocument) {
        self.open_tab_with_document(url, active, InMemoryDocument::new())
    }

    /// Opens a page whose root element starts out as `document`.
    pub fn open_tab_with_document(
        &mut self,
        url: Option<&str>,
        active: bool,
        document: InMemoryDocument,
    ) -> (String, SharedDocument) {
        let (tab_id, scriptable) = {
            let mut tabs = self.router.tabs();
            let id = tabs.create_tab(url, active);
            let scriptable = tabs.get_tab(&id).is_some_and(|t| t.is_scriptable());
            (id, scriptable)
        };

        let document = SharedDocument::new(document);
        let task = self.load_page(&tab_id, &document, scriptable);

        self.pages.insert(
            tab_id.clone(),
            PageHandle {
                document: document.clone(),
                task,
            },
        );
        (tab_id, document)
    }

    /// Loads a tab's page again at its current URL.
    pub async fn reload(&mut self, tab_id: &str) -> Result<(), TabError> {
        let url = self
            .router
            .tabs()
            .get_tab(tab_id)
            .map(|tab| tab.url.clone())
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        self.navigate(tab_id, url.as_deref()).await
    }

    /// Points a tab at `url` and loads the new page into its document.
    ///
    /// The old content script is stopped and its theme taken off the
    /// document first. The new page gets a fresh content script, which reads
    /// the stored settings, when `url` is scriptable.
    pub async fn navigate(&mut self, tab_id: &str, url: Option<&str>) -> Result<(), TabError> {
        let scriptable = {
            let mut tabs = self.router.tabs();
            tabs.update_tab_url(tab_id, url)?;
            tabs.get_tab(tab_id).is_some_and(|t| t.is_scriptable())
        };
        let (document, previous) = match self.pages.get_mut(tab_id) {
            Some(page) => (page.document.clone(), page.task.take()),
            None => return Err(TabError::NotFound(tab_id.to_string())),
        };

        self.router.unregister(tab_id);
        if let Some(task) = previous {
            match task.await {
                Ok(mut session) => session.unload(),
                Err(e) => tracing::error!("Content script for tab {} failed: {}", tab_id, e),
            }
        }

        let task = self.load_page(tab_id, &document, scriptable);
        if let Some(page) = self.pages.get_mut(tab_id) {
            page.task = task;
        }
        Ok(())
    }

    /// Starts the content script for a freshly loaded page.
    ///
    /// Browser-internal pages are tracked but never styled.
    fn load_page(
        &self,
        tab_id: &str,
        document: &SharedDocument,
        scriptable: bool,
    ) -> Option<ContentTask> {
        if !scriptable {
            tracing::debug!("Tab {} is restricted, no content script", tab_id);
            return None;
        }
        let inbox = self.router.register(tab_id);
        let session = ContentSession::new(document.clone());
        let span = tracing::info_span!("content_script", tab = %tab_id);
        Some(tokio::spawn(
            run_content_script(session, self.store.clone(), inbox).instrument(span),
        ))
    }

    /// The document of an open page.
    pub fn document(&self, tab_id: &str) -> Option<SharedDocument> {
        self.pages.get(tab_id).map(|p| p.document.clone())
    }

    /// Closes a tab and waits for its content script to finish.
    pub async fn close_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        self.router.tabs().close_tab(tab_id)?;
        self.router.unregister(tab_id);
        if let Some(page) = self.pages.remove(tab_id) {
            Self::join(tab_id, page).await;
        }
        Ok(())
    }

    /// Closes every page.
    pub async fn shutdown(&mut self) {
        for (tab_id, page) in std::mem::take(&mut self.pages) {
            self.router.unregister(&tab_id);
            Self::join(&tab_id, page).await;
        }
    }

    async fn join(tab_id: &str, page: PageHandle) {
        if let Some(task) = page.task {
            if let Err(e) = task.await {
                tracing::error!("Content script for tab {} failed: {}", tab_id, e);
            }
        }
    }

    /// A fresh popup bound to this host's store and tabs.
    pub fn popup(&self) -> PopupController<S, MessageRouter> {
        PopupController::new(self.store.clone(), Arc::clone(&self.router))
    }
}
