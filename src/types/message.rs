use serde::{Deserialize, Serialize};

use super::settings::ThemeSettings;

/// A request exchanged between extension contexts, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Popup → background: read the merged settings.
    GetSettings,
    /// Popup → content script: apply these settings now.
    ApplySettings { settings: ThemeSettings },
    /// Flip the theme on the page without touching the store.
    ToggleTheme,
    /// Report the page's theme state.
    GetStatus,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::GetSettings => "getSettings",
            Request::ApplySettings { .. } => "applySettings",
            Request::ToggleTheme => "toggleTheme",
            Request::GetStatus => "getStatus",
        }
    }
}

/// Reply to a [`Request`].
///
/// Untagged: each variant matches the JSON shape the caller expects. Variant
/// order matters for deserialization, most specific first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// `{success: false, error}`
    Failure { success: bool, error: String },
    /// `{success, enabled}`
    Toggled { success: bool, enabled: bool },
    /// `{enabled, settings}`; `settings` is `null` until the page has loaded them.
    Status {
        enabled: bool,
        settings: Option<ThemeSettings>,
    },
    /// `{success}`
    Ack { success: bool },
    /// `{settings}`
    Settings { settings: ThemeSettings },
    /// `{error}`
    Error { error: String },
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack { success: true }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Response::Failure {
            success: false,
            error: error.into(),
        }
    }

    /// True for acknowledgements that report success.
    pub fn is_success(&self) -> bool {
        match self {
            Response::Ack { success } | Response::Toggled { success, .. } => *success,
            Response::Status { .. } | Response::Settings { .. } => true,
            Response::Failure { .. } | Response::Error { .. } => false,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Failure { error, .. } | Response::Error { error } => Some(error),
            _ => None,
        }
    }
}
