//! Toast center configuration.
//!
//! # Responsibility
//! - Hold the limits and delays a `ToastCenter` runs with.
//! - Apply `TOASTLINE_*` environment overrides.
//!
//! # Invariants
//! - A validated config has nonzero `limit`, `remove_delay_ms` and
//!   `pump_interval_ms`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Maximum number of toasts kept in the store.
pub const DEFAULT_TOAST_LIMIT: usize = 5;
/// Delay between dismissal and removal.
pub const DEFAULT_REMOVE_DELAY_MS: u64 = 1_200;
/// Duration hint filled in when the caller gives none.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4_500;
/// Upper bound on how long a timer pump sleeps between checks.
pub const DEFAULT_PUMP_INTERVAL_MS: u64 = 50;

pub const ENV_LIMIT: &str = "TOASTLINE_LIMIT";
pub const ENV_REMOVE_DELAY_MS: &str = "TOASTLINE_REMOVE_DELAY_MS";
pub const ENV_DEFAULT_DURATION_MS: &str = "TOASTLINE_DEFAULT_DURATION_MS";
pub const ENV_AUTO_DISMISS: &str = "TOASTLINE_AUTO_DISMISS";
pub const ENV_PUMP_INTERVAL_MS: &str = "TOASTLINE_PUMP_INTERVAL_MS";

/// Runtime settings for one toast center.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub limit: usize,
    pub remove_delay_ms: u64,
    pub default_duration_ms: u64,
    /// When `true`, the center dismisses toasts once their duration elapses.
    pub auto_dismiss: bool,
    pub pump_interval_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TOAST_LIMIT,
            remove_delay_ms: DEFAULT_REMOVE_DELAY_MS,
            default_duration_ms: DEFAULT_TOAST_DURATION_MS,
            auto_dismiss: false,
            pump_interval_ms: DEFAULT_PUMP_INTERVAL_MS,
        }
    }
}

impl ToastConfig {
    /// Defaults with process environment overrides applied, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading overrides through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = read_override(&lookup, ENV_LIMIT)? {
            config.limit = value;
        }
        if let Some(value) = read_override(&lookup, ENV_REMOVE_DELAY_MS)? {
            config.remove_delay_ms = value;
        }
        if let Some(value) = read_override(&lookup, ENV_DEFAULT_DURATION_MS)? {
            config.default_duration_ms = value;
        }
        if let Some(value) = read_override(&lookup, ENV_AUTO_DISMISS)? {
            config.auto_dismiss = value;
        }
        if let Some(value) = read_override(&lookup, ENV_PUMP_INTERVAL_MS)? {
            config.pump_interval_ms = value;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::ZeroValue("limit"));
        }
        if self.remove_delay_ms == 0 {
            return Err(ConfigError::ZeroValue("remove_delay_ms"));
        }
        if self.pump_interval_ms == 0 {
            return Err(ConfigError::ZeroValue("pump_interval_ms"));
        }
        Ok(())
    }

    pub fn remove_delay(&self) -> Duration {
        Duration::from_millis(self.remove_delay_ms)
    }

    pub fn pump_interval(&self) -> Duration {
        Duration::from_millis(self.pump_interval_ms)
    }
}

fn read_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidOverride {
            key,
            value: trimmed.to_string(),
        })
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroValue(&'static str),
    InvalidOverride { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroValue(field) => write!(f, "config `{field}` must be greater than zero"),
            Self::InvalidOverride { key, value } => {
                write!(f, "environment override `{key}` has invalid value `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}
