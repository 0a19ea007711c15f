//! Method-result caching around a shared service handle

use super::descriptor::{CacheMarker, ContractDescriptor, MethodDescriptor};
use crate::cache::{Cache, CacheConfig, CacheValue};
use crate::error::CacheError;
use crate::key::{KeyArg, KeyGenerator, KeyParam};
use crate::manager::CacheManager;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One call routed through a [`CacheInterceptor`]
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    contract: &'a str,
    method: &'a str,
    args: Vec<KeyArg>,
}

impl<'a> Invocation<'a> {
    pub fn new(contract: &'a str, method: &'a str) -> Self {
        Self {
            contract,
            method,
            args: Vec::new(),
        }
    }

    /// Append the next positional argument
    pub fn arg<A: Serialize + fmt::Debug + ?Sized>(mut self, value: &A) -> Self {
        self.args.push(KeyArg::of(value));
        self
    }

    pub fn contract(&self) -> &str {
        self.contract
    }

    pub fn method(&self) -> &str {
        self.method
    }
}

/// A contract method with its effective marker and key flags
#[derive(Debug, Clone)]
struct ResolvedMethod {
    contract: String,
    name: String,
    marker: Option<CacheMarker>,
    params: Vec<KeyParam>,
}

/// Decorator applying cache markers to calls on a shared target
///
/// The dispatch table is resolved once, at construction. Calls are routed by
/// contract and method name; a call nothing is declared for goes straight to
/// the target.
pub struct CacheInterceptor<T: ?Sized> {
    target: Arc<T>,
    manager: Arc<CacheManager>,
    key_generator: KeyGenerator,
    cache_config: CacheConfig,
    dispatch: HashMap<String, HashMap<String, ResolvedMethod>>,
}

impl<T: ?Sized> CacheInterceptor<T> {
    pub fn builder(target: Arc<T>, manager: Arc<CacheManager>) -> CacheInterceptorBuilder<T> {
        CacheInterceptorBuilder {
            target,
            manager,
            contracts: Vec::new(),
            implementation: None,
            key_generator: KeyGenerator::default(),
            cache_config: CacheConfig::default(),
        }
    }

    /// The undecorated service
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    /// Effective marker of a contract method
    pub fn marker(&self, contract: &str, method: &str) -> Option<&CacheMarker> {
        self.resolve(contract, method).and_then(|m| m.marker.as_ref())
    }

    /// Whether any routed method carries a marker
    pub fn has_cache_markers(&self) -> bool {
        self.dispatch
            .values()
            .flat_map(|methods| methods.values())
            .any(|m| m.marker.is_some())
    }

    /// Run `call` on the target, applying the method's marker
    ///
    /// Cache failures never surface to the caller: they are logged and the
    /// target is invoked as if the method were unmarked. Every non-null
    /// result of a cacheable method is stored; use
    /// [`invoke_fallible`](Self::invoke_fallible) for methods returning
    /// `Result`.
    pub fn invoke<R, F>(&self, invocation: Invocation<'_>, call: F) -> R
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce(&T) -> R,
    {
        self.dispatch_call(invocation, call, |value: R| value, |result: &R| Some(result))
    }

    /// Like [`invoke`](Self::invoke) for methods returning `Result`
    ///
    /// Only the `Ok` payload is cached. An `Err` is returned to the caller
    /// and never stored, so the next call runs the target again.
    pub fn invoke_fallible<V, E, F>(
        &self,
        invocation: Invocation<'_>,
        call: F,
    ) -> std::result::Result<V, E>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce(&T) -> std::result::Result<V, E>,
    {
        self.dispatch_call(
            invocation,
            call,
            Ok,
            |result: &std::result::Result<V, E>| result.as_ref().ok(),
        )
    }

    /// Route a call by marker
    ///
    /// `wrap` rebuilds a result from a cached payload; `storable` extracts
    /// the payload worth caching from a fresh result.
    fn dispatch_call<R, V, F, W, S>(
        &self,
        invocation: Invocation<'_>,
        call: F,
        wrap: W,
        storable: S,
    ) -> R
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce(&T) -> R,
        W: FnOnce(V) -> R,
        S: FnOnce(&R) -> Option<&V>,
    {
        let Some(method) = self.resolve(invocation.contract, invocation.method) else {
            return call(&*self.target);
        };

        match &method.marker {
            None => call(&*self.target),
            Some(CacheMarker::InvalidateOne { cache_name }) => {
                self.invalidate_one(cache_name, method, &invocation);
                call(&*self.target)
            }
            Some(CacheMarker::InvalidateAll { cache_name }) => {
                self.invalidate_all(cache_name);
                call(&*self.target)
            }
            Some(CacheMarker::Cacheable { cache_name }) => {
                self.cached(cache_name, method, &invocation, call, wrap, storable)
            }
        }
    }

    fn resolve(&self, contract: &str, method: &str) -> Option<&ResolvedMethod> {
        self.dispatch.get(contract).and_then(|methods| methods.get(method))
    }

    fn key_for(&self, method: &ResolvedMethod, invocation: &Invocation<'_>) -> String {
        self.key_generator.generate(
            &method.contract,
            &method.name,
            &method.params,
            &invocation.args,
        )
    }

    fn invalidate_one(&self, cache_name: &str, method: &ResolvedMethod, invocation: &Invocation<'_>) {
        let key = self.key_for(method, invocation);

        match self.manager.get(cache_name) {
            Ok(cache) => {
                cache.delete(&key);
                debug!("Cache entry with key {} evicted from cache {}", key, cache_name);
            }
            Err(e) => warn!(
                "Failed to evict cache entry from cache {} before {}: {}",
                cache_name, method.name, e
            ),
        }
    }

    fn invalidate_all(&self, cache_name: &str) {
        match self.manager.get(cache_name) {
            Ok(cache) => {
                cache.clear();
                debug!("All entries evicted from cache {}", cache_name);
            }
            Err(e) => warn!("Failed to clear cache {}: {}", cache_name, e),
        }
    }

    fn cached<R, V, F, W, S>(
        &self,
        cache_name: &str,
        method: &ResolvedMethod,
        invocation: &Invocation<'_>,
        call: F,
        wrap: W,
        storable: S,
    ) -> R
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce(&T) -> R,
        W: FnOnce(V) -> R,
        S: FnOnce(&R) -> Option<&V>,
    {
        let cache = match self.manager.get_or_create(cache_name, self.cache_config) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(
                    "Cache {} unavailable, invoking {} uncached: {}",
                    cache_name, method.name, e
                );
                return call(&*self.target);
            }
        };

        let key = self.key_for(method, invocation);
        if let Some(value) = cache.get(&key) {
            match serde_json::from_value::<V>(value) {
                Ok(payload) => {
                    debug!("Cache hit for {} in cache {}", method.name, cache_name);
                    return wrap(payload);
                }
                Err(e) => warn!(
                    "Cached value for {} in cache {} does not decode, recomputing: {}",
                    method.name,
                    cache_name,
                    CacheError::from(e)
                ),
            }
        }

        debug!("Cache miss for {} in cache {}", method.name, cache_name);
        let result = call(&*self.target);

        let Some(payload) = storable(&result) else {
            debug!("{} failed, result not cached", method.name);
            return result;
        };

        match serde_json::to_value(payload) {
            Ok(CacheValue::Null) => {
                debug!("{} returned nothing, not caching", method.name);
            }
            Ok(value) => {
                cache.put(&key, value);
            }
            Err(e) => warn!(
                "Result of {} cannot be stored in cache {}: {}",
                method.name,
                cache_name,
                CacheError::from(e)
            ),
        }

        result
    }
}

impl<T: ?Sized> fmt::Debug for CacheInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheInterceptor")
            .field("contracts", &self.dispatch.keys().collect::<Vec<_>>())
            .field("key_generator", &self.key_generator)
            .field("cache_config", &self.cache_config)
            .finish()
    }
}

/// Builder for [`CacheInterceptor`]
pub struct CacheInterceptorBuilder<T: ?Sized> {
    target: Arc<T>,
    manager: Arc<CacheManager>,
    contracts: Vec<ContractDescriptor>,
    implementation: Option<ContractDescriptor>,
    key_generator: KeyGenerator,
    cache_config: CacheConfig,
}

impl<T: ?Sized> CacheInterceptorBuilder<T> {
    /// Route calls for a contract the target fulfils
    pub fn contract(mut self, contract: ContractDescriptor) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Markers declared on the target's concrete type
    pub fn implementation(mut self, implementation: ContractDescriptor) -> Self {
        self.implementation = Some(implementation);
        self
    }

    pub fn key_generator(mut self, key_generator: KeyGenerator) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Configuration for caches created on first cacheable call
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn build(self) -> CacheInterceptor<T> {
        let mut dispatch = HashMap::new();
        for contract in &self.contracts {
            let methods = resolve_contract(contract, self.implementation.as_ref());
            dispatch.insert(contract.name.clone(), methods);
        }

        info!("Cache interceptor built for {} contracts", dispatch.len());

        CacheInterceptor {
            target: self.target,
            manager: self.manager,
            key_generator: self.key_generator,
            cache_config: self.cache_config,
            dispatch,
        }
    }
}

/// Wrap `target` for every given contract with default settings
pub fn decorate<T: ?Sized>(
    target: Arc<T>,
    contracts: impl IntoIterator<Item = ContractDescriptor>,
    manager: Arc<CacheManager>,
) -> CacheInterceptor<T> {
    contracts
        .into_iter()
        .fold(CacheInterceptor::builder(target, manager), |builder, contract| {
            builder.contract(contract)
        })
        .build()
}

fn resolve_contract(
    contract: &ContractDescriptor,
    implementation: Option<&ContractDescriptor>,
) -> HashMap<String, ResolvedMethod> {
    let mut methods = HashMap::new();

    for method in &contract.methods {
        let fallback = implementation.and_then(|i| i.find_matching(method));
        let resolved = resolve_method(&contract.name, method, fallback);

        if method.marker.is_none() {
            if let Some(marker) = &resolved.marker {
                debug!(
                    "{}.{} uses {} declared on the implementation",
                    contract.name, method.name, marker
                );
            }
        }

        methods.entry(method.name.clone()).or_insert(resolved);
    }

    methods
}

fn resolve_method(
    contract: &str,
    method: &MethodDescriptor,
    fallback: Option<&MethodDescriptor>,
) -> ResolvedMethod {
    let marker = method
        .marker
        .clone()
        .or_else(|| fallback.and_then(|m| m.marker.clone()));

    let params = method
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let key = param.key
                || fallback
                    .and_then(|m| m.params.get(i))
                    .map(|p| p.key)
                    .unwrap_or(false);
            KeyParam::new(param.type_name.clone(), key)
        })
        .collect();

    ResolvedMethod {
        contract: contract.to_string(),
        name: method.name.clone(),
        marker,
        params,
    }
}
