//! Configuration for a named cache

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default maximum number of entries per cache
pub const DEFAULT_MAX_ENTRIES: i64 = 1000;

/// Default time-to-live, in seconds
pub const DEFAULT_TIME_TO_LIVE: i64 = 3600;

/// Environment variable overriding `max_entries`
pub const ENV_MAX_ENTRIES: &str = "CACHE_MAX_ENTRIES";

/// Environment variable overriding `time_to_live`
pub const ENV_TIME_TO_LIVE: &str = "CACHE_TIME_TO_LIVE";

/// Immutable configuration of a cache
///
/// Both fields are signed:
/// - `max_entries <= 0` disables count-based eviction
/// - `time_to_live <= 0` makes every entry expire on its next read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries before the least recently used one is evicted
    pub max_entries: i64,

    /// Maximum age of an entry, in seconds
    pub time_to_live: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            time_to_live: DEFAULT_TIME_TO_LIVE,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Whether count-based eviction applies
    pub fn is_bounded(&self) -> bool {
        self.max_entries > 0
    }

    /// Time-to-live in milliseconds, the unit entry ages are compared in
    pub fn ttl_millis(&self) -> i64 {
        self.time_to_live.saturating_mul(1000)
    }

    /// Time-to-live as a `Duration`; zero when caching is effectively disabled
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.time_to_live.max(0) as u64)
    }

    /// Load configuration from the environment
    ///
    /// A `.env` file is honoured when present. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = Self::builder();
        if let Some(max_entries) = read_env_i64(ENV_MAX_ENTRIES)? {
            builder = builder.max_entries(max_entries);
        }
        if let Some(ttl) = read_env_i64(ENV_TIME_TO_LIVE)? {
            builder = builder.time_to_live(ttl);
        }

        let config = builder.build();
        debug!("Loaded cache config from environment: {:?}", config);
        Ok(config)
    }
}

fn read_env_i64(name: &str) -> Result<Option<i64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| CacheError::Config(format!("{} must be an integer ({}): {}", name, raw, e))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(CacheError::Config(format!("{}: {}", name, e))),
    }
}

/// Builder for cache configuration; unset fields take the defaults
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    max_entries: Option<i64>,
    time_to_live: Option<i64>,
}

impl CacheConfigBuilder {
    /// Set maximum number of cache entries (`<= 0` for unbounded)
    pub fn max_entries(mut self, max: i64) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set time-to-live in seconds
    pub fn time_to_live(mut self, seconds: i64) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            time_to_live: self.time_to_live.unwrap_or(defaults.time_to_live),
        }
    }
}
