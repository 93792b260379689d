// PageShade shared type definitions
// Each submodule defines types used across the extension contexts.

pub mod errors;
pub mod message;
pub mod settings;
pub mod storage;
pub mod style;
pub mod tab;
