//! Core type definitions for the cache system

use crate::cache::{config::CacheConfig, entry::CacheEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Value type stored in registry caches
///
/// Method results are kept as JSON values so that every backend, including
/// remote ones, can hold any serializable result. `Value::Null` stands for
/// an absent result and is never stored by the interceptor.
pub type CacheValue = serde_json::Value;

/// A cache handle shared between the registry and its callers
pub type SharedCache = Arc<dyn Cache<CacheValue>>;

/// Capability contract implemented by every cache backend
///
/// In-process and distributed backends alike must be safe to call from many
/// threads at once. `get_entry`/`get` are recency-affecting reads.
pub trait Cache<T>: Send + Sync {
    /// Name the cache is registered under
    fn name(&self) -> &str;

    /// Configuration the cache was built with
    fn config(&self) -> &CacheConfig;

    /// Read an entry, touching it on success
    fn get_entry(&self, key: &str) -> Option<CacheEntry<T>>;

    /// Read a value, touching its entry on success
    fn get(&self, key: &str) -> Option<T> {
        self.get_entry(key).map(CacheEntry::into_value)
    }

    /// Insert or replace a value, returning the previous entry
    fn put(&self, key: &str, value: T) -> Option<CacheEntry<T>>;

    /// Remove an entry, returning it
    fn delete(&self, key: &str) -> Option<CacheEntry<T>>;

    /// Number of resident entries
    fn size(&self) -> usize;

    /// Remove every entry
    fn clear(&self);

    /// Usage counters; backends without bookkeeping only report their size
    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.size(),
            ..CacheStats::default()
        }
    }
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Reads answered from the cache
    pub hits: u64,

    /// Reads that found nothing or an expired entry
    pub misses: u64,

    /// Number of entries currently in cache
    pub entries: usize,

    /// Entries dropped by the LRU policy
    pub evictions: u64,

    /// Entries dropped on read because their TTL ran out
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}, evictions: {}, expirations: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.evictions,
            self.expirations
        )
    }
}
