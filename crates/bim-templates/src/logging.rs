//! Logging initialization
//!
//! Installs a `tracing-subscriber` registry filtered by `RUST_LOG`
//! (default `info`) with pretty or JSON output.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON lines, for log collection
    Json,
    /// Human-readable multi-line output
    #[default]
    Pretty,
}

/// Install the global subscriber
///
/// Only the first call has an effect. If another subscriber is already
/// installed it is left in place.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // An already installed subscriber is kept.
        let _ = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .try_init(),
        };
    });
}
