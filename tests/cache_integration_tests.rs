//! Integration tests for the cache engine
//!
//! These tests verify the in-memory cache end to end:
//! - Basic cache operations
//! - LRU eviction
//! - TTL expiration
//! - Statistics
//! - Concurrent access

use ouroboros_cache::cache::{Cache, CacheConfig, InMemoryCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn config(max_entries: i64, time_to_live: i64) -> CacheConfig {
    CacheConfig::builder()
        .max_entries(max_entries)
        .time_to_live(time_to_live)
        .build()
}

#[test]
fn test_basic_cache_operations() {
    let cache = InMemoryCache::new("basic", config(100, 60));

    assert!(cache.put("key1", "value1".to_string()).is_none());
    assert_eq!(cache.get("key1"), Some("value1".to_string()));

    let previous = cache.put("key1", "value2".to_string()).unwrap();
    assert_eq!(previous.value, "value1");
    assert_eq!(cache.get("key1"), Some("value2".to_string()));
    assert_eq!(cache.size(), 1);

    let deleted = cache.delete("key1").unwrap();
    assert_eq!(deleted.value, "value2");
    assert_eq!(cache.get("key1"), None);
    assert!(cache.delete("key1").is_none());
}

#[test]
fn test_lru_eviction_scenario() {
    let cache = InMemoryCache::new("scenario", config(2, 100));

    cache.put("k1", "v1".to_string());
    cache.put("k2", "v2".to_string());
    cache.put("k3", "v3".to_string());

    assert_eq!(cache.get("k1"), None);
    assert_eq!(cache.get("k2"), Some("v2".to_string()));
    assert_eq!(cache.get("k3"), Some("v3".to_string()));
    assert_eq!(cache.size(), 2);
}

#[test]
fn test_lru_eviction_respects_reads() {
    let cache = InMemoryCache::new("lru", config(3, 300));

    cache.put("key1", 1);
    cache.put("key2", 2);
    cache.put("key3", 3);

    // key1 becomes most recent, key2 is now the eldest
    cache.get("key1");
    cache.put("key4", 4);

    assert!(cache.get("key2").is_none());
    assert!(cache.get("key1").is_some());
    assert!(cache.get("key3").is_some());
    assert!(cache.get("key4").is_some());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_eviction_happens_once_per_put() {
    let cache = InMemoryCache::new("bounded", config(10, 300));

    for i in 0..100 {
        cache.put(&format!("key_{}", i), i);
        assert!(cache.size() <= 10);
    }

    assert_eq!(cache.size(), 10);
    assert_eq!(cache.stats().evictions, 90);
    assert_eq!(
        cache.keys_by_recency().first().map(String::as_str),
        Some("key_90")
    );
}

#[test]
fn test_ttl_expiration_scenario() {
    let cache = InMemoryCache::new("ttl", config(5, 1));

    cache.put("k", "v".to_string());
    assert_eq!(cache.get("k"), Some("v".to_string()));

    thread::sleep(Duration::from_millis(1100));

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.size(), 0);

    let stats = cache.stats();
    assert_eq!(stats.expirations, 1);
}

#[test]
fn test_expired_entry_stays_resident_until_read() {
    let cache = InMemoryCache::new("lazy", config(5, 0));

    cache.put("k", 1);
    assert!(cache.contains_key("k"));
    assert_eq!(cache.size(), 1);

    assert_eq!(cache.get("k"), None);
    assert!(!cache.contains_key("k"));
}

#[test]
fn test_cache_stats() {
    let cache = InMemoryCache::new("stats", config(100, 60));

    cache.put("k1", "v1".to_string());
    cache.put("k2", "v2".to_string());

    cache.get("k1"); // Hit
    cache.get("k1"); // Hit
    cache.get("k3"); // Miss

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 2);
    assert!(stats.hit_rate() > 0.6);
}

#[test]
fn test_clear_keeps_cache_usable() {
    let cache = InMemoryCache::new("clear", config(3, 60));

    for i in 0..3 {
        cache.put(&format!("k{}", i), i);
    }
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.keys_by_recency().is_empty());

    cache.put("again", 7);
    assert_eq!(cache.get("again"), Some(7));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u64,
    name: String,
    tags: Vec<String>,
}

#[test]
fn test_structured_values() {
    let cache = InMemoryCache::new("profiles", config(10, 60));
    let profile = Profile {
        id: 7,
        name: "Ada".to_string(),
        tags: vec!["admin".to_string()],
    };

    cache.put("profile:7", profile.clone());

    let entry = cache.get_entry("profile:7").unwrap();
    assert_eq!(entry.key, "profile:7");
    assert_eq!(entry.value, profile);
    assert!(entry.accessed >= entry.created);
}

#[test]
fn test_concurrent_cache_access() {
    let cache = Arc::new(InMemoryCache::new("concurrent", config(1000, 60)));

    thread::scope(|scope| {
        for i in 0..10 {
            let cache = cache.clone();
            scope.spawn(move || {
                for j in 0..10 {
                    let key = format!("key_{}_{}", i, j);
                    let value = format!("value_{}_{}", i, j);
                    cache.put(&key, value.clone());
                    assert_eq!(cache.get(&key), Some(value));
                }
            });
        }
    });

    let stats = cache.stats();
    assert_eq!(stats.entries, 100);
    assert_eq!(stats.hits, 100);
}

#[test]
fn test_concurrent_access_respects_bound() {
    let cache = Arc::new(InMemoryCache::new("contended", config(16, 60)));

    thread::scope(|scope| {
        for i in 0..8 {
            let cache = cache.clone();
            scope.spawn(move || {
                for j in 0..200 {
                    let key = format!("key_{}", (i * 31 + j) % 64);
                    cache.put(&key, j);
                    cache.get(&key);
                    if j % 7 == 0 {
                        cache.delete(&key);
                    }
                }
            });
        }
    });

    assert!(cache.size() <= 16);
    assert_eq!(cache.keys_by_recency().len(), cache.size());
}

#[test]
fn test_cache_performance_characteristics() {
    let cache = InMemoryCache::new("perf", config(10_000, 60));

    let start = std::time::Instant::now();
    for i in 0..1000 {
        cache.put(&format!("key_{}", i), format!("value_{}", i));
    }
    let insert_duration = start.elapsed();

    let start = std::time::Instant::now();
    for i in 0..1000 {
        cache.get(&format!("key_{}", i));
    }
    let read_duration = start.elapsed();

    println!("Insert 1000 entries: {:?}", insert_duration);
    println!("Read 1000 entries: {:?}", read_duration);

    assert!(insert_duration.as_millis() < 5000);
    assert!(read_duration.as_millis() < 5000);

    let stats = cache.stats();
    assert_eq!(stats.entries, 1000);
    assert_eq!(stats.hits, 1000);
}
