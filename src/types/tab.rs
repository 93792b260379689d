use serde::{Deserialize, Serialize};

/// A browser tab as seen by the extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    /// `None` when the extension is not allowed to see the URL.
    pub url: Option<String>,
    pub title: String,
    pub created_at: i64,
}

/// URL prefixes of browser-internal pages content scripts never run in.
pub const RESTRICTED_URL_PREFIXES: [&str; 3] = ["chrome://", "chrome-extension://", "edge://"];

impl Tab {
    /// True when a content script can run in this tab.
    pub fn is_scriptable(&self) -> bool {
        match &self.url {
            Some(url) if !url.is_empty() => !RESTRICTED_URL_PREFIXES
                .iter()
                .any(|prefix| url.starts_with(prefix)),
            _ => false,
        }
    }
}
