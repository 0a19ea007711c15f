//! Cache backend providers
//!
//! A provider is a factory for caches backed by one storage technology. The
//! manager picks the available provider with the highest priority.

use crate::cache::{CacheConfig, CacheValue, InMemoryCache, SharedCache};
use crate::error::Result;
use std::sync::Arc;
use tracing::info;

/// Name of the built-in in-process provider
pub const DEFAULT_PROVIDER_NAME: &str = "default";

/// Priority of the built-in in-process provider
pub const DEFAULT_PROVIDER_PRIORITY: i32 = 0;

/// Factory for caches of one backend
pub trait CacheProvider: Send + Sync {
    /// Unique provider name
    fn name(&self) -> &str;

    /// Selection priority; higher wins
    fn priority(&self) -> i32 {
        DEFAULT_PROVIDER_PRIORITY
    }

    /// Whether the backend can currently serve caches. May change over time.
    fn is_available(&self) -> bool;

    /// Build a cache registered under `name`
    fn create_cache(&self, name: &str, config: CacheConfig) -> Result<SharedCache>;
}

/// Always-available provider building [`InMemoryCache`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCacheProvider;

impl DefaultCacheProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CacheProvider for DefaultCacheProvider {
    fn name(&self) -> &str {
        DEFAULT_PROVIDER_NAME
    }

    fn is_available(&self) -> bool {
        true
    }

    fn create_cache(&self, name: &str, config: CacheConfig) -> Result<SharedCache> {
        info!("Creating default cache: {}", name);
        Ok(Arc::new(InMemoryCache::<CacheValue>::new(name, config)))
    }
}
