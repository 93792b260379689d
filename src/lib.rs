//! PageShade — dims and restyles web pages from a synced set of preferences.
//!
//! The crate models the extension's three contexts (background worker,
//! content script, popup) as owned sessions that communicate only through a
//! key-value store and a message router. This library crate exposes all
//! modules for embedders and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod logging;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod types;
