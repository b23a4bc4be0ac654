//! Log output setup.
//!
//! Library code only emits `tracing` events; applications call [`init`]
//! once at start-up to print them.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. An unparsable level
/// falls back to `info`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter(config))
        .try_init()
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
