//! Log output setup.
//!
//! The library logs through `tracing`; embedders call [`init`] once to print
//! those events. The level comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. Later calls are no-ops.
pub fn init() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
