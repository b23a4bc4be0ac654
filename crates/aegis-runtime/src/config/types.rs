//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use crate::storage::default_storage_path;
use crate::telemetry::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers. Every
/// section is `#[serde(default)]`, so a config file only needs the keys it
/// overrides.
///
/// # Example
///
/// ```
/// use aegis_runtime::config::{AegisConfig, StorageBackend};
///
/// let config = AegisConfig::default();
/// assert_eq!(config.storage.backend, StorageBackend::Memory);
/// assert_eq!(config.sync.poll_interval_ms, 500);
/// assert_eq!(config.telemetry.capacity, 50);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AegisConfig {
    /// Durable storage backend.
    pub storage: StorageConfig,

    /// Cross-tab sync bridge.
    pub sync: SyncConfig,

    /// Simulated sign-in/sign-up latency.
    pub latency: LatencyConfig,

    /// Gate redirect targets.
    pub gate: GateConfig,

    /// Telemetry log.
    pub telemetry: TelemetryConfig,

    /// Global hotkeys.
    pub hotkeys: HotkeysConfig,

    /// Log output.
    pub logging: LoggingConfig,
}

impl AegisConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they differ
    /// from the default, so a partial file never resets earlier layers.
    pub fn merge(&mut self, other: &Self) {
        self.storage.merge(&other.storage);
        self.sync.merge(&other.sync);
        self.latency.merge(&other.latency);
        self.gate.merge(&other.gate);
        self.telemetry.merge(&other.telemetry);
        self.hotkeys.merge(&other.hotkeys);
        self.logging.merge(&other.logging);
    }
}

/// Which [`KeyValueStore`](crate::storage::KeyValueStore) backs an origin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    #[default]
    Memory,
    /// One file per key under [`StorageConfig::dir`].
    File,
    /// Every operation fails, as when the host blocks storage.
    Disabled,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind.
    pub backend: StorageBackend,

    /// Directory for the file backend. `~` is expanded.
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Returns the configured directory or `~/.aegis/storage`.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_storage_path)
    }

    fn merge(&mut self, other: &Self) {
        if other.backend != StorageBackend::default() {
            self.backend = other.backend;
        }
        if other.dir.is_some() {
            self.dir.clone_from(&other.dir);
        }
    }
}

/// Sync bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Fallback polling period in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

impl SyncConfig {
    /// Returns the polling period. Zero is clamped to one millisecond.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    fn merge(&mut self, other: &Self) {
        if other.poll_interval_ms != Self::default().poll_interval_ms {
            self.poll_interval_ms = other.poll_interval_ms;
        }
    }
}

/// Simulated network latency for the auth flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LatencyConfig {
    /// Whether delays are applied at all.
    pub enabled: bool,

    /// Delay before a sign-in resolves, in milliseconds.
    pub sign_in_ms: u64,

    /// Delay before a sign-up resolves, in milliseconds.
    pub sign_up_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sign_in_ms: 800,
            sign_up_ms: 1_200,
        }
    }
}

impl LatencyConfig {
    /// Effective sign-in delay.
    #[must_use]
    pub fn sign_in(&self) -> Duration {
        self.delay(self.sign_in_ms)
    }

    /// Effective sign-up delay.
    #[must_use]
    pub fn sign_up(&self) -> Duration {
        self.delay(self.sign_up_ms)
    }

    fn delay(&self, ms: u64) -> Duration {
        if self.enabled {
            Duration::from_millis(ms)
        } else {
            Duration::ZERO
        }
    }

    fn merge(&mut self, other: &Self) {
        let default = Self::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.sign_in_ms != default.sign_in_ms {
            self.sign_in_ms = other.sign_in_ms;
        }
        if other.sign_up_ms != default.sign_up_ms {
            self.sign_up_ms = other.sign_up_ms;
        }
    }
}

/// Gate redirect targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Where an unauthenticated visitor is sent.
    pub login_route: String,

    /// Where an authenticated but unentitled visitor is sent.
    pub denied_route: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".into(),
            denied_route: "/".into(),
        }
    }
}

impl GateConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();
        if other.login_route != default.login_route {
            self.login_route.clone_from(&other.login_route);
        }
        if other.denied_route != default.denied_route {
            self.denied_route.clone_from(&other.denied_route);
        }
    }
}

/// Telemetry log configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Maximum retained events. Can be lowered but never raised above
    /// [`DEFAULT_CAPACITY`]; see [`TelemetryConfig::capacity`].
    pub capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TelemetryConfig {
    /// Returns the effective capacity, capped at [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.min(DEFAULT_CAPACITY)
    }

    fn merge(&mut self, other: &Self) {
        if other.capacity != Self::default().capacity {
            self.capacity = other.capacity;
        }
    }
}

/// Global hotkey bindings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HotkeysConfig {
    /// Combo that triggers the panic action (sign out and reset).
    pub panic: String,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            panic: "Control+Shift+X".into(),
        }
    }
}

impl HotkeysConfig {
    fn merge(&mut self, other: &Self) {
        if other.panic != Self::default().panic {
            self.panic.clone_from(&other.panic);
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `"info"` or `"aegis_runtime=debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        if other.level != Self::default().level {
            self.level.clone_from(&other.level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = AegisConfig::from_toml("").unwrap();
        assert_eq!(config, AegisConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AegisConfig::from_toml(
            r#"
[storage]
backend = "file"
dir = "/tmp/aegis"

[sync]
poll_interval_ms = 100
"#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.resolved_dir(), PathBuf::from("/tmp/aegis"));
        assert_eq!(config.sync.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.gate, GateConfig::default());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = AegisConfig::default();
        config.latency.enabled = false;
        config.gate.denied_route = "/pricing".into();

        let toml = config.to_toml().unwrap();
        assert_eq!(AegisConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn merge_overrides_only_non_defaults() {
        let mut base = AegisConfig::default();
        base.gate.login_route = "/signin".into();
        base.telemetry.capacity = 10;

        let mut overlay = AegisConfig::default();
        overlay.telemetry.capacity = 20;

        base.merge(&overlay);
        assert_eq!(base.gate.login_route, "/signin");
        assert_eq!(base.telemetry.capacity, 20);
    }

    #[test]
    fn disabled_latency_is_zero() {
        let latency = LatencyConfig {
            enabled: false,
            ..LatencyConfig::default()
        };
        assert_eq!(latency.sign_in(), Duration::ZERO);
        assert_eq!(latency.sign_up(), Duration::ZERO);
        assert_eq!(LatencyConfig::default().sign_in(), Duration::from_millis(800));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let sync = SyncConfig { poll_interval_ms: 0 };
        assert_eq!(sync.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn telemetry_capacity_is_capped() {
        let mut telemetry = TelemetryConfig::default();
        assert_eq!(telemetry.capacity(), 50);

        telemetry.capacity = 10;
        assert_eq!(telemetry.capacity(), 10);

        telemetry.capacity = 5_000;
        assert_eq!(telemetry.capacity(), 50);
    }

    #[test]
    fn storage_backend_from_str() {
        assert_eq!("FILE".parse::<StorageBackend>(), Ok(StorageBackend::File));
        assert_eq!("disabled".parse::<StorageBackend>(), Ok(StorageBackend::Disabled));
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}
