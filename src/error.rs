//! Error types for cache operations
//!
//! Registry contract violations (`AlreadyExists`, `NotFound`) and a missing
//! provider are surfaced to callers. Key generation and serialization
//! problems are recovered inside the crate and only ever logged.

use thiserror::Error;

/// Main error type for cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A cache with this name is already registered
    #[error("Cache {name} already exists")]
    AlreadyExists { name: String },

    /// No cache with this name is registered
    #[error("Cache {name} does not exist")]
    NotFound { name: String },

    /// A provider with this name is already registered
    #[error("Cache provider {name} is already registered")]
    ProviderExists { name: String },

    /// No registered provider is currently available
    #[error("No cache provider is available")]
    ProviderUnavailable,

    /// A provider refused to build a cache
    #[error("Provider {provider} failed to create cache: {reason}")]
    ProviderFailure { provider: String, reason: String },

    /// Primary key digest could not be computed
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Value (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    pub(crate) fn already_exists(name: &str) -> Self {
        CacheError::AlreadyExists {
            name: name.to_string(),
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        CacheError::NotFound {
            name: name.to_string(),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
