//! # Cache Engine
//!
//! The `Cache` contract every backend honours, and the in-process
//! implementation used by the default provider.
//!
//! ## Features
//!
//! - **LRU Eviction**: once a put exceeds `max_entries`, the least recently
//!   inserted-or-read entry is evicted
//! - **Lazy TTL Expiration**: entries older than `time_to_live` are dropped
//!   when read; nothing sweeps in the background
//! - **Thread Safety**: one lock per cache instance
//!
//! ## Example
//!
//! ```rust
//! use ouroboros_cache::cache::{Cache, CacheConfig, InMemoryCache};
//!
//! let config = CacheConfig::builder()
//!     .max_entries(2)
//!     .time_to_live(100)
//!     .build();
//!
//! let cache = InMemoryCache::new("scenario", config);
//! cache.put("k1", "v1".to_string());
//! cache.put("k2", "v2".to_string());
//! cache.put("k3", "v3".to_string());
//!
//! assert_eq!(cache.get("k1"), None);
//! assert_eq!(cache.get("k2"), Some("v2".to_string()));
//! assert_eq!(cache.get("k3"), Some("v3".to_string()));
//! ```

pub mod config;
pub mod entry;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use store::InMemoryCache;
pub use types::{Cache, CacheStats, CacheValue, SharedCache};
