//! Cache markers and the descriptors that carry them
//!
//! A [`ContractDescriptor`] describes either a capability trait (the
//! contract callers see) or a concrete implementation of it. Markers
//! declared on the contract take precedence; the implementation's
//! descriptor is consulted for a method with the same signature when the
//! contract declares nothing.

use std::fmt;

/// Cache behaviour attached to a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheMarker {
    /// Serve results from the named cache, storing them on a miss
    Cacheable { cache_name: String },

    /// Delete the call's key from the named cache before invoking
    InvalidateOne { cache_name: String },

    /// Clear the named cache before invoking
    InvalidateAll { cache_name: String },
}

impl CacheMarker {
    /// The cache the marker addresses
    pub fn cache_name(&self) -> &str {
        match self {
            CacheMarker::Cacheable { cache_name }
            | CacheMarker::InvalidateOne { cache_name }
            | CacheMarker::InvalidateAll { cache_name } => cache_name,
        }
    }
}

impl fmt::Display for CacheMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMarker::Cacheable { cache_name } => write!(f, "cacheable({})", cache_name),
            CacheMarker::InvalidateOne { cache_name } => write!(f, "invalidate({})", cache_name),
            CacheMarker::InvalidateAll { cache_name } => {
                write!(f, "invalidate_all({})", cache_name)
            }
        }
    }
}

/// Declared method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,

    /// Declared type, used in the key signature
    pub type_name: String,

    /// Whether the parameter takes part in the cache key
    pub key: bool,
}

/// Declared method with its optional marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    pub marker: Option<CacheMarker>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            marker: None,
        }
    }

    /// Append a parameter that does not take part in the key
    pub fn param(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.push_param(name, type_name, false)
    }

    /// Append a parameter that takes part in the key
    pub fn key_param(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.push_param(name, type_name, true)
    }

    pub fn cacheable(self, cache_name: impl Into<String>) -> Self {
        self.marked(CacheMarker::Cacheable {
            cache_name: cache_name.into(),
        })
    }

    pub fn invalidate(self, cache_name: impl Into<String>) -> Self {
        self.marked(CacheMarker::InvalidateOne {
            cache_name: cache_name.into(),
        })
    }

    pub fn invalidate_all(self, cache_name: impl Into<String>) -> Self {
        self.marked(CacheMarker::InvalidateAll {
            cache_name: cache_name.into(),
        })
    }

    /// Replace the method's marker
    pub fn marked(mut self, marker: CacheMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Same name and same arity
    ///
    /// Parameter type names are not compared: a contract and its
    /// implementation may spell the same type differently.
    pub fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.arity() == other.arity()
    }

    fn push_param(mut self, name: impl Into<String>, type_name: impl Into<String>, key: bool) -> Self {
        self.params.push(ParamDescriptor {
            name: name.into(),
            type_name: type_name.into(),
            key,
        });
        self
    }
}

/// Cache metadata of a capability trait or of one of its implementations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    /// Declaring type name; the identity part of every key derived for it
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// First method declared with this name
    pub fn find(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Method with the same signature as `method`
    pub fn find_matching(&self, method: &MethodDescriptor) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.same_signature(method))
    }

    /// Whether any method carries a marker
    pub fn has_markers(&self) -> bool {
        self.methods.iter().any(|m| m.marker.is_some())
    }
}
