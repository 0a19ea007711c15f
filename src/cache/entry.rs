//! Cache entry with creation and access timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value with its timestamps
///
/// `created` is fixed at insertion; `accessed` moves forward on every
/// successful read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cache key
    pub key: String,

    /// The cached value
    pub value: T,

    /// When the entry was inserted
    pub created: DateTime<Utc>,

    /// Last successful read (or insertion)
    pub accessed: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time
    pub fn new(key: impl Into<String>, value: T) -> Self {
        let now = Utc::now();

        Self {
            key: key.into(),
            value,
            created: now,
            accessed: now,
        }
    }

    /// Mark the entry as read
    pub fn touch(&mut self) {
        self.accessed = Utc::now();
    }

    /// Milliseconds elapsed since insertion
    pub fn age_millis(&self) -> i64 {
        (Utc::now() - self.created).num_milliseconds()
    }

    /// Age of the entry
    pub fn age(&self) -> Duration {
        (Utc::now() - self.created)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }

    /// Whether the entry is too old for a time-to-live given in milliseconds
    ///
    /// An entry is alive while `age < ttl`, so any `ttl_millis <= 0`
    /// expires it immediately.
    pub fn is_expired(&self, ttl_millis: i64) -> bool {
        self.age_millis() >= ttl_millis
    }

    /// Consume the entry, keeping the value
    pub fn into_value(self) -> T {
        self.value
    }
}
