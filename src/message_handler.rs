//! JSON message boundary for the extension contexts.
//!
//! Messages arrive from the host as untyped JSON. These functions parse them
//! into [`Request`]s, hand them to the right context, and serialize the reply.
//! Every input, including malformed ones, produces a JSON response.

use serde_json::{json, Value};

use crate::services::background::BackgroundWorker;
use crate::services::content_script::ContentSession;
use crate::services::settings_store::KeyValueStore;
use crate::services::style_applicator::DocumentRoot;
use crate::types::errors::MessageError;
use crate::types::message::{Request, Response};

const KNOWN_ACTIONS: [&str; 4] = ["getSettings", "applySettings", "toggleTheme", "getStatus"];

/// Parses a raw message into a [`Request`].
pub fn parse_request(raw: &Value) -> Result<Request, MessageError> {
    let action = raw
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| MessageError::InvalidRequest("missing action".to_string()))?;
    if !KNOWN_ACTIONS.contains(&action) {
        return Err(MessageError::InvalidRequest(format!("unknown action: {}", action)));
    }
    serde_json::from_value(raw.clone())
        .map_err(|e| MessageError::InvalidRequest(format!("{}: {}", action, e)))
}

/// Serializes a response.
pub fn response_to_value(response: &Response) -> Value {
    serde_json::to_value(response)
        .unwrap_or_else(|e| json!({"success": false, "error": e.to_string()}))
}

/// Handles a raw command message in a content script.
pub fn dispatch_content<D: DocumentRoot>(session: &mut ContentSession<D>, raw: &Value) -> Value {
    let response = match parse_request(raw) {
        Ok(request) => session.handle_request(request),
        Err(e) => {
            tracing::warn!("Error handling message: {}", e);
            Response::failure(e.to_string())
        }
    };
    response_to_value(&response)
}

/// Handles a raw query message in the background worker.
pub async fn dispatch_background<S: KeyValueStore>(worker: &BackgroundWorker<S>, raw: &Value) -> Value {
    let response = match parse_request(raw) {
        Ok(request) => worker.handle_request(request).await,
        Err(e) => {
            tracing::warn!("Error handling message: {}", e);
            Response::Error {
                error: e.to_string(),
            }
        }
    };
    response_to_value(&response)
}
