//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────┐
//! │  1. Environment Variables (AEGIS_*)      │  Runtime override
//! ├──────────────────────────────────────────┤
//! │  2. Explicit file (ConfigLoader::with_file)
//! ├──────────────────────────────────────────┤
//! │  3. Global Config (~/.aegis/config.toml) │  User defaults
//! ├──────────────────────────────────────────┤
//! │  4. Default Values (compile-time)        │  Fallback
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `AEGIS_STORAGE_BACKEND` | `storage.backend` | `memory`/`file`/`disabled` |
//! | `AEGIS_STORAGE_DIR` | `storage.dir` | PathBuf |
//! | `AEGIS_POLL_INTERVAL_MS` | `sync.poll_interval_ms` | u64 |
//! | `AEGIS_SIMULATE_LATENCY` | `latency.enabled` | bool |
//! | `AEGIS_SIGN_IN_LATENCY_MS` | `latency.sign_in_ms` | u64 |
//! | `AEGIS_SIGN_UP_LATENCY_MS` | `latency.sign_up_ms` | u64 |
//! | `AEGIS_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.aegis/config.toml
//!
//! [storage]
//! backend = "file"
//! dir = "~/.aegis/storage"
//!
//! [sync]
//! poll_interval_ms = 500
//!
//! [latency]
//! enabled = true
//! sign_in_ms = 800
//! sign_up_ms = 1200
//!
//! [gate]
//! login_route = "/login"
//! denied_route = "/"
//!
//! [telemetry]
//! capacity = 50
//!
//! [hotkeys]
//! panic = "Control+Shift+X"
//!
//! [logging]
//! level = "info"
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{
    AegisConfig, GateConfig, HotkeysConfig, LatencyConfig, LoggingConfig, StorageBackend,
    StorageConfig, SyncConfig, TelemetryConfig,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".aegis")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}
