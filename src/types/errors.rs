use std::fmt;
use std::time::Duration;

// === StoreError ===

/// Errors raised by the settings store and its backends.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The underlying store could not be read or written.
    Unavailable(String),
    /// A stored value could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Settings store unavailable: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

// === InputError ===

/// Errors related to user supplied setting values.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// A value is outside its domain or of the wrong type.
    InvalidInput(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::InvalidInput(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for InputError {}

// === MessageError ===

/// Errors related to delivering a message between extension contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageError {
    /// Nothing is listening in the target context.
    NoReceiver(String),
    /// No eligible tab was found to deliver to.
    NoActiveTarget,
    /// The receiver did not answer in time.
    Timeout(Duration),
    /// The request could not be understood.
    InvalidRequest(String),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::NoReceiver(target) => {
                write!(f, "Could not establish connection: no receiver in {}", target)
            }
            MessageError::NoActiveTarget => write!(f, "No active tab found"),
            MessageError::Timeout(after) => {
                write!(f, "No response received within {} ms", after.as_millis())
            }
            MessageError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for MessageError {}

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TabError {
    /// Tab with the given ID was not found.
    NotFound(String),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
        }
    }
}

impl std::error::Error for TabError {}

// === PopupError ===

/// Why applying settings from the popup did not fully succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupError {
    /// A form value is out of range; nothing was saved.
    InvalidInput(InputError),
    /// The settings could not be saved.
    Store(StoreError),
    /// The settings were saved but could not be delivered to the page.
    Message(MessageError),
    /// The active tab is a browser-internal page.
    RestrictedPage(String),
    /// The page answered but reported a failure.
    Rejected(String),
}

impl fmt::Display for PopupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            PopupError::Store(e) => write!(f, "{}", e),
            PopupError::Message(e) => write!(f, "{}", e),
            PopupError::RestrictedPage(url) => write!(f, "Restricted page: {}", url),
            PopupError::Rejected(msg) => write!(f, "Page rejected settings: {}", msg),
        }
    }
}

impl std::error::Error for PopupError {}

impl From<InputError> for PopupError {
    fn from(e: InputError) -> Self {
        PopupError::InvalidInput(e)
    }
}

impl From<StoreError> for PopupError {
    fn from(e: StoreError) -> Self {
        PopupError::Store(e)
    }
}

impl From<MessageError> for PopupError {
    fn from(e: MessageError) -> Self {
        PopupError::Message(e)
    }
}
