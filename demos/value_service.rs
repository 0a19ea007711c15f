//! Demonstrates method-result caching around a value service
//!
//! This example shows how to:
//! - Declare cache markers on a service contract
//! - Decorate a service so reads are cached and writes evict
//! - Switch backend providers at runtime
//!
//! Cache sizing is read from `CACHE_MAX_ENTRIES` / `CACHE_TIME_TO_LIVE`
//! (a `.env` file is honoured).

use ouroboros_cache::intercept::{
    CacheInterceptor, ContractDescriptor, Invocation, MethodDescriptor,
};
use ouroboros_cache::{
    Cache, CacheConfig, CacheManager, DefaultCacheProvider, KeyGenerator, KeySignature,
    DEFAULT_PROVIDER_NAME,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONTRACT: &str = "ValueService";

trait ValueService: Send + Sync {
    fn get_value(&self, key: &str) -> Option<String>;
    fn update_value(&self, key: &str, value: &str);
    fn clear_all_values(&self);
}

#[derive(Default)]
struct StoredValues {
    values: Mutex<HashMap<String, String>>,
    lookups: AtomicUsize,
}

impl ValueService for StoredValues {
    fn get_value(&self, key: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.values.lock().get(key).cloned()
    }

    fn update_value(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    fn clear_all_values(&self) {
        self.values.lock().clear();
    }
}

struct CachedValues(CacheInterceptor<dyn ValueService>);

impl ValueService for CachedValues {
    fn get_value(&self, key: &str) -> Option<String> {
        self.0
            .invoke(Invocation::new(CONTRACT, "get_value").arg(key), |s| {
                s.get_value(key)
            })
    }

    fn update_value(&self, key: &str, value: &str) {
        self.0.invoke(
            Invocation::new(CONTRACT, "update_value").arg(key).arg(value),
            |s| s.update_value(key, value),
        )
    }

    fn clear_all_values(&self) {
        self.0
            .invoke(Invocation::new(CONTRACT, "clear_all_values"), |s| {
                s.clear_all_values()
            })
    }
}

fn value_service_contract() -> ContractDescriptor {
    ContractDescriptor::new(CONTRACT)
        .method(
            MethodDescriptor::new("get_value")
                .key_param("key", "str")
                .cacheable("values"),
        )
        .method(
            MethodDescriptor::new("update_value")
                .key_param("key", "str")
                .param("value", "str")
                .invalidate("values"),
        )
        .method(MethodDescriptor::new("clear_all_values").invalidate_all("values"))
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ouroboros_cache=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env()?;
    info!("=== Value Service Cache Demo ===");
    info!("Cache configuration: {:?}", config);

    let manager = Arc::new(CacheManager::new());
    manager.add_provider(Arc::new(DefaultCacheProvider::new()))?;

    let backing = Arc::new(StoredValues::default());
    let target: Arc<dyn ValueService> = backing.clone();
    let service = CachedValues(
        CacheInterceptor::builder(target, manager.clone())
            .contract(value_service_contract())
            // update_value(key, value) must evict what get_value(key) stored
            .key_generator(KeyGenerator::new().with_signature(KeySignature::Contributing))
            .cache_config(config)
            .build(),
    );

    println!("1. Reading through the cache...");
    service.update_value("greeting", "hello");
    for _ in 0..3 {
        println!("   greeting = {:?}", service.get_value("greeting"));
    }
    println!(
        "   backing lookups: {}\n",
        backing.lookups.load(Ordering::SeqCst)
    );

    println!("2. Updating evicts the cached entry...");
    service.update_value("greeting", "bonjour");
    println!("   greeting = {:?}", service.get_value("greeting"));
    println!(
        "   backing lookups: {}\n",
        backing.lookups.load(Ordering::SeqCst)
    );

    println!("3. Missing values are never cached...");
    for _ in 0..2 {
        println!("   missing = {:?}", service.get_value("missing"));
    }
    println!(
        "   backing lookups: {}\n",
        backing.lookups.load(Ordering::SeqCst)
    );

    let values = manager.get("values")?;
    println!("4. Cache statistics: {}\n", values.stats());

    println!("5. Clearing all values...");
    service.clear_all_values();
    println!("   cached entries: {}", manager.get("values")?.size());
    println!("   greeting = {:?}\n", service.get_value("greeting"));

    println!("6. Removing the only provider...");
    manager.remove_provider(DEFAULT_PROVIDER_NAME);
    println!("   active provider: {}", manager.provider_name());
    println!("   greeting = {:?}", service.get_value("greeting"));

    manager.shutdown();
    Ok(())
}
