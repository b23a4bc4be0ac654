//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.aegis/config.toml`)
//! 3. Explicit config file ([`ConfigLoader::with_file`])
//! 4. Environment variables (`AEGIS_*`)
//!
//! Each layer overrides the previous.

use super::{default_config_path, AegisConfig, ConfigError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Helper macro for parsing integer environment variables.
macro_rules! parse_env_u64 {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = val
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid_env_var($var, "expected unsigned integer"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```
/// use aegis_runtime::config::{AegisConfig, ConfigLoader};
///
/// let config = ConfigLoader::new()
///     .skip_global_config()
///     .skip_env_vars()
///     .load()
///     .unwrap();
/// assert_eq!(config, AegisConfig::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.aegis/config.toml).
    global_config_path: Option<PathBuf>,

    /// Explicit config file, layered over the global one.
    file: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Adds an explicit config file layered over the global config.
    ///
    /// Unlike the global file, a missing explicit file is an error.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file cannot be read or parsed,
    /// or an `AEGIS_*` variable holds an invalid value.
    pub fn load(&self) -> Result<AegisConfig, ConfigError> {
        let mut config = AegisConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if global_path.exists() {
                let global = load_file(&global_path)?;
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global);
            }
        }

        if let Some(ref path) = self.file {
            let explicit = load_file(path)?;
            debug!(path = %path.display(), "Loaded config file");
            config.merge(&explicit);
        }

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        Ok(config)
    }
}

fn load_file(path: &Path) -> Result<AegisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    AegisConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Applies `AEGIS_*` environment variable overrides.
fn apply_env_vars(config: &mut AegisConfig) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var("AEGIS_STORAGE_BACKEND") {
        config.storage.backend = val
            .parse()
            .map_err(|msg: String| ConfigError::invalid_env_var("AEGIS_STORAGE_BACKEND", msg))?;
    }
    if let Ok(val) = std::env::var("AEGIS_STORAGE_DIR") {
        config.storage.dir = Some(PathBuf::from(val));
    }

    parse_env_u64!(config.sync.poll_interval_ms, "AEGIS_POLL_INTERVAL_MS");
    parse_env_bool!(config.latency.enabled, "AEGIS_SIMULATE_LATENCY");
    parse_env_u64!(config.latency.sign_in_ms, "AEGIS_SIGN_IN_LATENCY_MS");
    parse_env_u64!(config.latency.sign_up_ms, "AEGIS_SIGN_UP_LATENCY_MS");

    if let Ok(val) = std::env::var("AEGIS_LOG_LEVEL") {
        config.logging.level = val;
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
