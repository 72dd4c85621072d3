//! `tracing`/`tracing-subscriber` initialisation shared by every binary
//! (C9). Kept tiny and boring on purpose: the interesting observability
//! decisions (what gets a span, what gets logged at `error!`) live at the
//! call sites, not here.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber reading its filter from `filter`
/// (normally a [`crate::arguments::LoggingArguments::log_filter`]), falling
/// back to `RUST_LOG` if set.
pub fn initialize(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .init();
}
