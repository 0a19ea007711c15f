//! In-process cache with LRU eviction and lazy TTL expiration

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    types::{Cache, CacheStats},
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Bounded in-memory cache
///
/// This implementation provides:
/// - One exclusive lock per cache guarding every operation, reads included,
///   since a read changes recency
/// - TTL expiration checked lazily when an entry is read
/// - Eviction of exactly one least recently used entry once a put pushes the
///   cache over `max_entries`
/// - Hit/miss/eviction counters
pub struct InMemoryCache<T> {
    name: String,
    config: CacheConfig,
    store: Mutex<CacheStore<T>>,
}

/// Internal cache storage
struct CacheStore<T> {
    /// Main storage: key -> entry
    entries: HashMap<String, Slot<T>>,

    /// Recency queue: tick -> key, oldest first
    lru_queue: BTreeMap<u64, String>,

    /// Next recency tick to hand out
    clock: u64,

    stats: CacheStats,
}

struct Slot<T> {
    entry: CacheEntry<T>,
    tick: u64,
}

impl<T> CacheStore<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru_queue: BTreeMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    fn next_tick(&mut self) -> u64 {
        let tick = self.clock;
        self.clock += 1;
        tick
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let slot = self.entries.remove(key)?;
        self.lru_queue.remove(&slot.tick);
        Some(slot.entry)
    }

    /// Drop the least recently used entry
    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.lru_queue.pop_first()?;
        self.entries.remove(&key);
        self.stats.evictions += 1;
        Some(key)
    }
}

impl<T> InMemoryCache<T> {
    /// Create a new cache with the given configuration
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        let name = name.into();
        info!("Initializing in-memory cache {} with config: {:?}", name, config);

        Self {
            name,
            config,
            store: Mutex::new(CacheStore::new()),
        }
    }

    /// Check if a key is resident, without touching it or checking its age
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().entries.contains_key(key)
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.store.lock().entries.is_empty()
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.store.lock().lru_queue.values().cloned().collect()
    }
}

impl<T: Clone + Send> Cache<T> for InMemoryCache<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn get_entry(&self, key: &str) -> Option<CacheEntry<T>> {
        let mut guard = self.store.lock();
        let store = &mut *guard;

        let expired = match store.entries.get(key) {
            Some(slot) => slot.entry.is_expired(self.config.ttl_millis()),
            None => {
                debug!("Cache miss: {}/{}", self.name, key);
                store.stats.misses += 1;
                return None;
            }
        };

        if expired {
            debug!("Cache entry expired: {}/{}", self.name, key);
            store.remove(key);
            store.stats.expirations += 1;
            store.stats.misses += 1;
            return None;
        }

        let tick = store.next_tick();
        let slot = store.entries.get_mut(key)?;
        slot.entry.touch();
        let previous_tick = std::mem::replace(&mut slot.tick, tick);
        let entry = slot.entry.clone();

        store.lru_queue.remove(&previous_tick);
        store.lru_queue.insert(tick, key.to_string());
        store.stats.hits += 1;

        debug!("Cache hit: {}/{}", self.name, key);
        Some(entry)
    }

    fn put(&self, key: &str, value: T) -> Option<CacheEntry<T>> {
        let mut guard = self.store.lock();
        let store = &mut *guard;

        let tick = store.next_tick();
        let previous = store.entries.insert(
            key.to_string(),
            Slot {
                entry: CacheEntry::new(key, value),
                tick,
            },
        );
        if let Some(previous) = &previous {
            store.lru_queue.remove(&previous.tick);
        }
        store.lru_queue.insert(tick, key.to_string());

        if self.config.is_bounded() && store.entries.len() as i64 > self.config.max_entries {
            if let Some(evicted) = store.evict_lru() {
                debug!("Evicting entry due to max_entries limit: {}/{}", self.name, evicted);
            }
        }

        previous.map(|slot| slot.entry)
    }

    fn delete(&self, key: &str) -> Option<CacheEntry<T>> {
        let removed = self.store.lock().remove(key);
        if removed.is_some() {
            debug!("Removed cache entry: {}/{}", self.name, key);
        }
        removed
    }

    fn size(&self) -> usize {
        self.store.lock().entries.len()
    }

    fn clear(&self) {
        let mut store = self.store.lock();
        let count = store.entries.len();
        store.entries.clear();
        store.lru_queue.clear();

        info!("Cleared {} entries from cache {}", count, self.name);
    }

    fn stats(&self) -> CacheStats {
        let store = self.store.lock();
        CacheStats {
            entries: store.entries.len(),
            ..store.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn cache_with(max_entries: i64, time_to_live: i64) -> InMemoryCache<String> {
        let config = CacheConfig::builder()
            .max_entries(max_entries)
            .time_to_live(time_to_live)
            .build();
        InMemoryCache::new("test", config)
    }

    #[test]
    fn test_basic_put_and_get() {
        let cache = cache_with(2, 1);

        assert!(cache.put("key1", "value1".to_string()).is_none());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_miss() {
        let cache = cache_with(10, 60);

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_returns_previous_entry() {
        let cache = cache_with(10, 60);

        cache.put("key1", "old".to_string());
        let previous = cache.put("key1", "new".to_string()).unwrap();

        assert_eq!(previous.key, "key1");
        assert_eq!(previous.value, "old");
        assert_eq!(cache.get("key1"), Some("new".to_string()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_max_entries_eviction() {
        let cache = cache_with(2, 100);

        cache.put("key1", "value1".to_string());
        cache.put("key2", "value2".to_string());
        cache.put("key3", "value3".to_string());

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.get("key2"), Some("value2".to_string()));
        assert_eq!(cache.get("key3"), Some("value3".to_string()));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_read_refreshes_recency() {
        let cache = cache_with(2, 100);

        cache.put("key1", "value1".to_string());
        cache.put("key2", "value2".to_string());
        assert!(cache.get("key1").is_some());
        cache.put("key3", "value3".to_string());

        assert!(cache.contains_key("key1"));
        assert!(!cache.contains_key("key2"));
        assert!(cache.contains_key("key3"));
    }

    #[test]
    fn test_replacing_refreshes_recency() {
        let cache = cache_with(2, 100);

        cache.put("key1", "value1".to_string());
        cache.put("key2", "value2".to_string());
        cache.put("key1", "value1b".to_string());
        cache.put("key3", "value3".to_string());

        assert_eq!(cache.keys_by_recency(), vec!["key1".to_string(), "key3".to_string()]);
    }

    #[test]
    fn test_unbounded_when_max_entries_not_positive() {
        for max_entries in [0, -1] {
            let cache = cache_with(max_entries, 100);
            for i in 0..50 {
                cache.put(&format!("key{}", i), format!("value{}", i));
            }
            assert_eq!(cache.size(), 50);
            assert_eq!(cache.stats().evictions, 0);
        }
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = cache_with(50, 1);

        cache.put("key1", "value1".to_string());
        sleep(Duration::from_millis(1100));

        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.size(), 0);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_read_before_expiry_touches_entry() {
        let cache = cache_with(10, 1);

        cache.put("key1", "value1".to_string());
        sleep(Duration::from_millis(20));

        let entry = cache.get_entry("key1").unwrap();
        assert!(entry.accessed > entry.created);
    }

    #[test]
    fn test_expiry_is_lazy() {
        let cache = cache_with(10, 0);

        cache.put("key1", "value1".to_string());
        assert_eq!(cache.size(), 1);
        assert!(cache.contains_key("key1"));

        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_delete() {
        let cache = cache_with(2, 1);

        cache.put("key1", "value1".to_string());
        let removed = cache.delete("key1").unwrap();
        assert_eq!(removed.value, "value1");

        assert_eq!(cache.get("key1"), None);
        assert!(cache.delete("key1").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = cache_with(2, 1);

        cache.put("key1", "value1".to_string());
        cache.put("key2", "value2".to_string());
        cache.clear();

        assert_eq!(cache.size(), 0);
        assert!(cache.is_empty());
        assert!(cache.keys_by_recency().is_empty());
    }
}
