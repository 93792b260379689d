// PageShade services
// Services implement the extension contexts and the collaborators they talk through.

pub mod background;
pub mod content_script;
pub mod memory_store;
pub mod message_router;
pub mod popup;
pub mod settings_store;
pub mod sqlite_store;
pub mod style_applicator;
