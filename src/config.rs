//! Injected configuration for the handler and its store.
//!
//! Nothing here has a built-in default location or credential. The store
//! connection string must be supplied, either directly or through
//! `PROFILE_GUARD_DATABASE_URL`.

use std::time::Duration;

use thiserror::Error;

use crate::sanitizer::DEFAULT_MAX_FIELD_LEN;
use crate::Secret;

/// Environment variable holding the store connection string.
pub const ENV_DATABASE_URL: &str = "PROFILE_GUARD_DATABASE_URL";
/// Environment variable holding the SQLite busy timeout in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "PROFILE_GUARD_BUSY_TIMEOUT_MS";
/// Environment variable holding the per-field character limit.
pub const ENV_MAX_FIELD_LEN: &str = "PROFILE_GUARD_MAX_FIELD_LEN";

/// Default SQLite busy timeout.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Errors produced while assembling configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A setting was present but could not be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Connection settings for the record store.
#[derive(Debug)]
pub struct StoreConfig {
    /// Path or `file:` URI of the SQLite database. Redacted in all output.
    pub url: Secret<String>,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Creates store settings with the default busy timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Secret::new(url.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Overrides the busy timeout.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl Clone for StoreConfig {
    fn clone(&self) -> Self {
        Self {
            url: self.url.duplicate_secret(),
            busy_timeout: self.busy_timeout,
        }
    }
}

/// Full configuration for a [`ProfileUpdateHandler`](crate::ProfileUpdateHandler).
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Store connection settings.
    pub store: StoreConfig,
    // Never 0; only `with_max_field_len` changes it.
    max_field_len: usize,
}

impl HandlerConfig {
    /// Creates a configuration with default limits.
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }

    /// Overrides the per-field character limit.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `max_field_len` is 0.
    pub fn with_max_field_len(mut self, max_field_len: usize) -> Result<Self, ConfigError> {
        if max_field_len == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_MAX_FIELD_LEN,
                reason: "must be greater than 0".to_string(),
            });
        }
        self.max_field_len = max_field_len;
        Ok(self)
    }

    /// Maximum characters admitted per request field.
    pub fn max_field_len(&self) -> usize {
        self.max_field_len
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if [`ENV_DATABASE_URL`] is unset and
    /// `ConfigError::Invalid` if a numeric setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary lookup function.
    ///
    /// `from_env` delegates here. Tests pass a closure over a map instead of
    /// mutating the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_DATABASE_URL))?;

        let busy_timeout = match lookup(ENV_BUSY_TIMEOUT_MS) {
            Some(raw) => Duration::from_millis(parse_number(ENV_BUSY_TIMEOUT_MS, &raw)?),
            None => DEFAULT_BUSY_TIMEOUT,
        };

        let config = Self::new(StoreConfig::new(url).with_busy_timeout(busy_timeout));

        match lookup(ENV_MAX_FIELD_LEN) {
            Some(raw) => {
                let value = parse_number(ENV_MAX_FIELD_LEN, &raw)?;
                let value = usize::try_from(value).map_err(|_| ConfigError::Invalid {
                    name: ENV_MAX_FIELD_LEN,
                    reason: "out of range".to_string(),
                })?;
                config.with_max_field_len(value)
            }
            None => Ok(config),
        }
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
