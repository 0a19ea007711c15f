//! # Cache Interception
//!
//! Applies cache markers declared on a capability contract (or, failing
//! that, on its implementation) to calls made through a shared handle.
//!
//! | Marker          | Before the call               | Result            |
//! |-----------------|-------------------------------|-------------------|
//! | `Cacheable`     | look the key up, return a hit | stored unless null |
//! | `InvalidateOne` | delete the call's key         | passed through    |
//! | `InvalidateAll` | clear the cache               | passed through    |
//!
//! ## Example
//!
//! ```rust
//! use ouroboros_cache::intercept::{decorate, ContractDescriptor, Invocation, MethodDescriptor};
//! use ouroboros_cache::cache::Cache;
//! use ouroboros_cache::CacheManager;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl Greeter {
//!     fn greet(&self, name: &str) -> String {
//!         format!("hello {}", name)
//!     }
//! }
//!
//! let contract = ContractDescriptor::new("Greeter").method(
//!     MethodDescriptor::new("greet")
//!         .key_param("name", "str")
//!         .cacheable("greetings"),
//! );
//!
//! let manager = Arc::new(CacheManager::with_default_provider());
//! let greeter = decorate(Arc::new(Greeter), [contract], manager.clone());
//!
//! let greeting: String = greeter.invoke(
//!     Invocation::new("Greeter", "greet").arg("ada"),
//!     |g| g.greet("ada"),
//! );
//! assert_eq!(greeting, "hello ada");
//! assert_eq!(manager.get("greetings").unwrap().size(), 1);
//! ```

pub mod descriptor;
pub mod interceptor;

pub use descriptor::{CacheMarker, ContractDescriptor, MethodDescriptor, ParamDescriptor};
pub use interceptor::{decorate, CacheInterceptor, CacheInterceptorBuilder, Invocation};
