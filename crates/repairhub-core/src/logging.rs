//! Tracing subscriber bootstrap for embedding applications.
//!
//! The subsystem has no binary of its own; whatever application embeds it
//! calls [`init`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from logging configuration.
///
/// The `RUST_LOG` environment variable takes precedence over the
/// configured level. Subsequent calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    match config.format.as_str() {
        "json" => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        }
        _ => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }
}
