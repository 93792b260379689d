//! Message Router — delivers command messages to content scripts.
//!
//! Each tab's content script registers an inbox. A sender gets exactly one
//! reply per request, or a typed error when nobody is listening or the reply
//! does not arrive within the response timeout.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::managers::tab_manager::{TabManager, TabManagerTrait};
use crate::types::errors::MessageError;
use crate::types::message::{Request, Response};
use crate::types::tab::Tab;

/// Requests a content script can have queued before senders wait.
const INBOX_CAPACITY: usize = 32;

/// Default time a sender waits for a reply.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A request together with the channel its reply goes back on.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

impl Envelope {
    /// Sends the reply. The sender may have given up already, which is fine.
    pub fn respond(self, response: Response) {
        if self.reply.send(response).is_err() {
            tracing::debug!("Reply dropped, sender no longer waiting");
        }
    }
}

/// The host's tab and messaging API, as used by the popup.
pub trait TabsApi: Send + Sync {
    /// The active tab of the current window, if any.
    fn query_active_tab(&self) -> impl Future<Output = Result<Option<Tab>, MessageError>> + Send;

    /// Sends `request` to the content script in `tab_id` and awaits its reply.
    fn send_message(
        &self,
        tab_id: &str,
        request: Request,
    ) -> impl Future<Output = Result<Response, MessageError>> + Send;
}

/// In-process router between the popup/background and per-tab content scripts.
pub struct MessageRouter {
    tabs: Mutex<TabManager>,
    inboxes: Mutex<HashMap<String, mpsc::Sender<Envelope>>>,
    response_timeout: Duration,
}

impl MessageRouter {
    pub fn new(response_timeout: Duration) -> Self {
        Self {
            tabs: Mutex::new(TabManager::new()),
            inboxes: Mutex::new(HashMap::new()),
            response_timeout,
        }
    }

    /// Access to the tab list.
    pub fn tabs(&self) -> MutexGuard<'_, TabManager> {
        self.tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn inboxes(&self) -> MutexGuard<'_, HashMap<String, mpsc::Sender<Envelope>>> {
        self.inboxes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a content script for `tab_id` and returns its inbox.
    /// Replaces any previous registration (e.g. after a reload).
    pub fn register(&self, tab_id: &str) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
        self.inboxes().insert(tab_id.to_string(), tx);
        rx
    }

    /// Removes the content script for `tab_id`. Returns false if none was registered.
    pub fn unregister(&self, tab_id: &str) -> bool {
        self.inboxes().remove(tab_id).is_some()
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    async fn exchange(
        sender: mpsc::Sender<Envelope>,
        tab_id: &str,
        request: Request,
    ) -> Result<Response, MessageError> {
        let (reply, response) = oneshot::channel();
        sender
            .send(Envelope { request, reply })
            .await
            .map_err(|_| MessageError::NoReceiver(format!("tab {}", tab_id)))?;
        response
            .await
            .map_err(|_| MessageError::NoReceiver(format!("tab {}", tab_id)))
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_TIMEOUT)
    }
}

impl TabsApi for MessageRouter {
    async fn query_active_tab(&self) -> Result<Option<Tab>, MessageError> {
        Ok(self.tabs().get_active_tab().cloned())
    }

    async fn send_message(&self, tab_id: &str, request: Request) -> Result<Response, MessageError> {
        let sender = {
            let inboxes = self.inboxes();
            inboxes.get(tab_id).cloned()
        };
        let sender = sender.ok_or_else(|| MessageError::NoReceiver(format!("tab {}", tab_id)))?;

        let action = request.action();
        match tokio::time::timeout(self.response_timeout, Self::exchange(sender, tab_id, request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("No reply to '{}' from tab {}", action, tab_id);
                Err(MessageError::Timeout(self.response_timeout))
            }
        }
    }
}
