//! # Ouroboros Cache (ouroboros-cache)
//!
//! Backend-agnostic method-result caching.
//!
//! ## Features
//!
//! - Bounded in-process cache with LRU eviction and lazy TTL expiration
//! - Named-cache registry over pluggable, prioritized backend providers
//! - Deterministic SHA-256 cache keys derived from selected call arguments
//! - Marker-driven interception: cache results, evict one key, or clear a cache
//!
//! ## Cache Engine
//!
//! ```rust
//! use ouroboros_cache::cache::{Cache, CacheConfig, InMemoryCache};
//!
//! let cache = InMemoryCache::new("values", CacheConfig::default());
//! cache.put("answer", 42);
//! assert_eq!(cache.get("answer"), Some(42));
//! ```
//!
//! ## Cache Manager
//!
//! Caches are created through the highest-priority available provider.
//! Registering or removing a provider recreates every cache through the new
//! active one.
//!
//! ```rust
//! use ouroboros_cache::{Cache, CacheConfig, CacheManager};
//! use serde_json::json;
//!
//! let manager = CacheManager::with_default_provider();
//! let users = manager.create("users", CacheConfig::default()).unwrap();
//! users.put("42", json!({ "name": "Ada" }));
//!
//! assert_eq!(manager.provider_name(), "default");
//! assert_eq!(manager.get("users").unwrap().get("42"), Some(json!({ "name": "Ada" })));
//! ```
//!
//! ## Interception
//!
//! See [`intercept`] for decorating a service with declared cache markers.

pub mod cache;
pub mod error;
pub mod intercept;
pub mod key;
pub mod manager;
pub mod provider;

// Re-export main types for convenience
pub use cache::{
    Cache, CacheConfig, CacheConfigBuilder, CacheEntry, CacheStats, CacheValue, InMemoryCache,
    SharedCache,
};
pub use error::{CacheError, Result};
pub use intercept::{
    decorate, CacheInterceptor, CacheInterceptorBuilder, CacheMarker, ContractDescriptor,
    Invocation, MethodDescriptor,
};
pub use key::{KeyArg, KeyDigest, KeyGenerator, KeyParam, KeySignature};
pub use manager::{CacheManager, NO_PROVIDER_NAME};
pub use provider::{CacheProvider, DefaultCacheProvider, DEFAULT_PROVIDER_NAME};
