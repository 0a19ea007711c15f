//! Named-cache registry backed by pluggable providers
//!
//! The manager owns the cache namespace and tracks the registered
//! providers. Whenever the provider set changes, the active provider is
//! recomputed and every registered cache is recreated through it with the
//! configuration it was first created with. Contents are discarded, not
//! migrated.

use crate::cache::{CacheConfig, SharedCache};
use crate::error::{CacheError, Result};
use crate::provider::{CacheProvider, DefaultCacheProvider};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name reported when no provider is active
pub const NO_PROVIDER_NAME: &str = "none";

/// Registry of named caches
///
/// Provider changes are serialized by the write lock and publish the new
/// active provider together with the rebuilt cache map, so readers see
/// either the old registry or the new one.
pub struct CacheManager {
    state: RwLock<ManagerState>,
}

struct ManagerState {
    /// Registered providers, in registration order
    providers: Vec<Arc<dyn CacheProvider>>,

    /// Provider new caches are created through
    active: Option<Arc<dyn CacheProvider>>,

    caches: HashMap<String, SharedCache>,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManager {
    /// Create a manager with no provider registered
    pub fn new() -> Self {
        info!("Instantiating cache manager");

        Self {
            state: RwLock::new(ManagerState {
                providers: Vec::new(),
                active: None,
                caches: HashMap::new(),
            }),
        }
    }

    /// Create a manager with the in-process provider registered
    pub fn with_default_provider() -> Self {
        let manager = Self::new();
        {
            let mut state = manager.state.write();
            state.providers.push(Arc::new(DefaultCacheProvider::new()));
            state.activate_best_provider();
        }
        manager
    }

    /// Register a provider and rebuild every cache through the new active one
    ///
    /// Provider names are unique; a second provider with a registered name
    /// is rejected with `ProviderExists` and nothing is rebuilt.
    pub fn add_provider(&self, provider: Arc<dyn CacheProvider>) -> Result<()> {
        let mut state = self.state.write();

        if state.providers.iter().any(|p| p.name() == provider.name()) {
            warn!("Cache provider {} is already registered", provider.name());
            return Err(CacheError::ProviderExists {
                name: provider.name().to_string(),
            });
        }

        info!(
            "Adding cache provider: {} (priority {})",
            provider.name(),
            provider.priority()
        );
        state.providers.push(provider);
        state.activate_best_provider();
        Ok(())
    }

    /// Unregister a provider by name
    ///
    /// Names are unique, so at most one provider is removed. Returns `false`
    /// when no provider with that name was registered.
    pub fn remove_provider(&self, name: &str) -> bool {
        let mut state = self.state.write();

        let before = state.providers.len();
        state.providers.retain(|p| p.name() != name);
        if state.providers.len() == before {
            debug!("Cache provider {} is not registered", name);
            return false;
        }

        info!("Removing cache provider: {}", name);
        state.activate_best_provider();
        true
    }

    /// Re-evaluate provider availability
    ///
    /// When the best available provider differs from the active one, caches
    /// are rebuilt exactly as on a provider change. Returns whether the active
    /// provider changed.
    pub fn refresh_provider(&self) -> bool {
        let mut state = self.state.write();

        let best = best_available(&state.providers);
        if provider_name(best.as_ref()) == provider_name(state.active.as_ref()) {
            return false;
        }

        info!(
            "Cache provider availability changed: {} -> {}",
            provider_name(state.active.as_ref()),
            provider_name(best.as_ref())
        );
        state.activate_best_provider();
        true
    }

    /// Name of the active provider, or `"none"`
    pub fn provider_name(&self) -> String {
        provider_name(self.state.read().active.as_ref()).to_string()
    }

    /// Names of the registered providers, in registration order
    pub fn provider_names(&self) -> Vec<String> {
        self.state
            .read()
            .providers
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Names of all registered caches, in no particular order
    pub fn list_names(&self) -> Vec<String> {
        self.state.read().caches.keys().cloned().collect()
    }

    /// Create and register a cache through the active provider
    pub fn create(&self, name: &str, config: CacheConfig) -> Result<SharedCache> {
        let mut state = self.state.write();

        if state.caches.contains_key(name) {
            return Err(CacheError::already_exists(name));
        }
        state.create_cache(name, config)
    }

    /// Look up a registered cache
    pub fn get(&self, name: &str) -> Result<SharedCache> {
        self.state
            .read()
            .caches
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::not_found(name))
    }

    /// Look up a cache, creating it with `config` if it is not registered
    ///
    /// Lookup and creation happen under one write lock, so concurrent first
    /// callers all receive the same cache.
    pub fn get_or_create(&self, name: &str, config: CacheConfig) -> Result<SharedCache> {
        if let Some(cache) = self.state.read().caches.get(name) {
            return Ok(cache.clone());
        }

        let mut state = self.state.write();
        if let Some(cache) = state.caches.get(name) {
            return Ok(cache.clone());
        }

        info!("Cache {} not found, creating it with {:?}", name, config);
        state.create_cache(name, config)
    }

    /// Remove every entry of one cache; the cache stays registered
    pub fn clear(&self, name: &str) -> Result<()> {
        let cache = self.get(name)?;
        info!("Clearing cache {}", name);
        cache.clear();
        Ok(())
    }

    /// Remove every entry of every cache; all caches stay registered
    pub fn clear_all(&self) {
        info!("Clearing all caches");
        for cache in self.state.read().caches.values() {
            cache.clear();
        }
    }

    /// Drop every registered cache
    pub fn shutdown(&self) {
        let mut state = self.state.write();
        info!("Cache manager shutting down, dropping {} caches", state.caches.len());
        state.caches.clear();
    }
}

impl ManagerState {
    fn create_cache(&mut self, name: &str, config: CacheConfig) -> Result<SharedCache> {
        let provider = self.active.clone().ok_or(CacheError::ProviderUnavailable)?;

        info!("Creating cache {} using provider: {}", name, provider.name());
        let cache = provider.create_cache(name, config)?;
        self.caches.insert(name.to_string(), cache.clone());
        Ok(cache)
    }

    /// Pick the best available provider and recreate every cache through it
    fn activate_best_provider(&mut self) {
        self.active = best_available(&self.providers);

        let Some(provider) = self.active.clone() else {
            if !self.caches.is_empty() {
                warn!(
                    "No cache provider available, dropping {} caches",
                    self.caches.len()
                );
            }
            self.caches = HashMap::new();
            return;
        };

        let mut rebuilt = HashMap::with_capacity(self.caches.len());
        for (name, old_cache) in &self.caches {
            info!("Recreating cache {} using provider: {}", name, provider.name());
            match provider.create_cache(name, *old_cache.config()) {
                Ok(cache) => {
                    rebuilt.insert(name.clone(), cache);
                }
                Err(e) => error!("Failed to recreate cache {}: {}", name, e),
            }
        }
        self.caches = rebuilt;
    }
}

/// Highest-priority available provider; the earliest registered wins ties
fn best_available(providers: &[Arc<dyn CacheProvider>]) -> Option<Arc<dyn CacheProvider>> {
    let mut best: Option<&Arc<dyn CacheProvider>> = None;
    for provider in providers.iter().filter(|p| p.is_available()) {
        match best {
            Some(current) if current.priority() >= provider.priority() => {}
            _ => best = Some(provider),
        }
    }
    best.cloned()
}

fn provider_name(provider: Option<&Arc<dyn CacheProvider>>) -> &str {
    provider.map(|p| p.name()).unwrap_or(NO_PROVIDER_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use serde_json::json;

    fn config() -> CacheConfig {
        CacheConfig::builder().time_to_live(10).max_entries(10).build()
    }

    #[test]
    fn test_multiple_cache_management() {
        let manager = CacheManager::with_default_provider();

        let cache1 = manager.create("cache1", config()).unwrap();
        let cache2 = manager.create("cache2", config()).unwrap();
        cache1.put("k1", json!("v1"));
        cache2.put("k2", json!("v2"));

        assert_eq!(cache1.get("k1"), Some(json!("v1")));
        assert_eq!(cache2.get("k2"), Some(json!("v2")));
        assert_eq!(cache1.get("k2"), None);
        assert_eq!(cache2.get("k1"), None);

        let mut names = manager.list_names();
        names.sort();
        assert_eq!(names, vec!["cache1".to_string(), "cache2".to_string()]);
    }

    #[test]
    fn test_clear_and_clear_all() {
        let manager = CacheManager::with_default_provider();

        let cache_a = manager.create("cacheA", config()).unwrap();
        let cache_b = manager.create("cacheB", config()).unwrap();
        cache_a.put("a", json!("1"));
        cache_b.put("b", json!("2"));

        manager.clear("cacheA").unwrap();
        assert_eq!(cache_a.get("a"), None);
        assert_eq!(cache_b.get("b"), Some(json!("2")));

        manager.clear_all();
        assert_eq!(cache_b.get("b"), None);
        assert_eq!(manager.list_names().len(), 2);
    }

    #[test]
    fn test_registry_errors() {
        let manager = CacheManager::with_default_provider();
        manager.create("cacheX", config()).unwrap();

        assert_eq!(
            manager.create("cacheX", config()).err(),
            Some(CacheError::AlreadyExists {
                name: "cacheX".to_string()
            })
        );
        assert!(matches!(
            manager.get("notfound"),
            Err(CacheError::NotFound { .. })
        ));
        assert!(matches!(
            manager.clear("notfound"),
            Err(CacheError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_without_provider() {
        let manager = CacheManager::new();

        assert_eq!(manager.provider_name(), "none");
        assert!(matches!(
            manager.create("cache", config()),
            Err(CacheError::ProviderUnavailable)
        ));
        assert!(matches!(
            manager.get_or_create("cache", config()),
            Err(CacheError::ProviderUnavailable)
        ));
        assert!(manager.list_names().is_empty());
    }

    #[test]
    fn test_get_or_create_returns_existing() {
        let manager = CacheManager::with_default_provider();

        let created = manager.get_or_create("lazy", config()).unwrap();
        created.put("k", json!(1));

        let again = manager.get_or_create("lazy", CacheConfig::default()).unwrap();
        assert_eq!(again.get("k"), Some(json!(1)));
        assert_eq!(again.config(), &config());
    }

    #[test]
    fn test_shutdown_drops_caches() {
        let manager = CacheManager::with_default_provider();
        manager.create("cache", config()).unwrap();

        manager.shutdown();
        assert!(manager.list_names().is_empty());
        assert_eq!(manager.provider_name(), "default");
    }

    #[test]
    fn test_duplicate_provider_name_rejected() {
        let manager = CacheManager::with_default_provider();
        manager.create("cache", config()).unwrap().put("k", json!(1));

        assert_eq!(
            manager.add_provider(Arc::new(DefaultCacheProvider::new())),
            Err(CacheError::ProviderExists {
                name: "default".to_string()
            })
        );
        assert_eq!(manager.provider_names(), vec!["default".to_string()]);

        // Rejection does not rebuild
        assert_eq!(manager.get("cache").unwrap().get("k"), Some(json!(1)));

        assert!(manager.remove_provider("default"));
        assert!(manager.provider_names().is_empty());
    }

    #[test]
    fn test_remove_unknown_provider() {
        let manager = CacheManager::with_default_provider();
        assert!(!manager.remove_provider("missing"));
        assert_eq!(manager.provider_names(), vec!["default".to_string()]);
    }
}
