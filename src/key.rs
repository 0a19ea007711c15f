//! Deterministic cache key derivation
//!
//! A key is derived from the declaring contract, the method's declared
//! parameter-type signature, and the canonical JSON rendering of the
//! contributing argument values. When any parameter is flagged as a key
//! parameter, only the flagged values contribute; otherwise every argument
//! does.

use crate::error::{CacheError, Result};
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::warn;

/// Digest used to turn key components into a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDigest {
    /// SHA-256, rendered as URL-safe base64
    #[default]
    Sha256,

    /// Non-cryptographic composite hash; the degraded mode
    Composite,
}

/// Which parameter types make up the identity signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySignature {
    /// Every declared parameter, so overloads never share keys
    #[default]
    Declared,

    /// Only the parameters contributing to the key
    ///
    /// Methods of one contract whose key parameters have the same types
    /// share keys, which lets an invalidating method target the entry a
    /// cacheable sibling with a narrower signature stored.
    Contributing,
}

/// Declared parameter as seen by the key generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParam {
    /// Declared type name, part of the identity signature
    pub type_name: String,

    /// Whether the parameter is flagged as a key parameter
    pub key: bool,
}

impl KeyParam {
    pub fn new(type_name: impl Into<String>, key: bool) -> Self {
        Self {
            type_name: type_name.into(),
            key,
        }
    }
}

/// An argument value rendered for key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyArg {
    rendered: std::result::Result<String, String>,
}

impl KeyArg {
    /// Render a value as canonical JSON (object keys sorted)
    ///
    /// Values JSON cannot represent keep their `Debug` form and push key
    /// generation into degraded mode.
    pub fn of<A: Serialize + fmt::Debug + ?Sized>(value: &A) -> Self {
        let rendered = serde_json::to_value(value)
            .map(|json| json.to_string())
            .map_err(|_| format!("{:?}", value));
        Self { rendered }
    }

    /// The absent value
    pub fn null() -> Self {
        Self {
            rendered: Ok("null".to_string()),
        }
    }

    fn text(&self) -> &str {
        match &self.rendered {
            Ok(json) => json,
            Err(debug) => debug,
        }
    }

    fn is_canonical(&self) -> bool {
        self.rendered.is_ok()
    }
}

/// Cache key generator
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator {
    digest: KeyDigest,
    signature: KeySignature,
    include_method_name: bool,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the method name in the identity component
    ///
    /// Off by default: keys are shared by every method of a contract with the
    /// same signature.
    pub fn with_method_name(mut self, include: bool) -> Self {
        self.include_method_name = include;
        self
    }

    pub fn with_digest(mut self, digest: KeyDigest) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_signature(mut self, signature: KeySignature) -> Self {
        self.signature = signature;
        self
    }

    /// Derive the key of a call
    pub fn generate(
        &self,
        declaring_type: &str,
        method: &str,
        params: &[KeyParam],
        args: &[KeyArg],
    ) -> String {
        if let Some(e) = arity_mismatch(params, args) {
            warn!("{}.{}: {}", declaring_type, method, e);
        }

        let selected = |i: usize| params.get(i).map(|p| p.key).unwrap_or(false);
        let any_selected = (0..args.len()).any(selected);
        let contributing: Vec<usize> = (0..args.len())
            .filter(|&i| !any_selected || selected(i))
            .collect();

        let signature_positions: Vec<usize> = match self.signature {
            KeySignature::Declared => (0..params.len().max(args.len())).collect(),
            KeySignature::Contributing => contributing.clone(),
        };
        let signature = signature_positions
            .iter()
            .map(|&i| params.get(i).map(|p| p.type_name.as_str()).unwrap_or("_"))
            .collect::<Vec<_>>()
            .join(",");
        let identity = if self.include_method_name {
            format!("{}.{}({})", declaring_type, method, signature)
        } else {
            format!("{}({})", declaring_type, signature)
        };

        let values: Vec<&KeyArg> = contributing.iter().map(|&i| &args[i]).collect();

        match self.digest_key(&identity, &values) {
            Ok(key) => key,
            Err(e) => {
                warn!("{}; using composite hash for {}", e, identity);
                composite_key(&identity, &values)
            }
        }
    }

    fn digest_key(&self, identity: &str, values: &[&KeyArg]) -> Result<String> {
        if self.digest == KeyDigest::Composite {
            return Err(CacheError::KeyGeneration(
                "SHA-256 digest disabled".to_string(),
            ));
        }
        if let Some(arg) = values.iter().find(|arg| !arg.is_canonical()) {
            return Err(CacheError::KeyGeneration(format!(
                "argument {} has no JSON form",
                arg.text()
            )));
        }

        let rendered = values.iter().map(|arg| arg.text()).collect::<Vec<_>>().join(",");
        let raw_key = format!("{}:[{}]", identity, rendered);
        let hash = Sha256::digest(raw_key.as_bytes());
        Ok(base64::engine::general_purpose::URL_SAFE.encode(hash))
    }
}

/// Error describing a call whose argument count differs from its declaration
fn arity_mismatch(params: &[KeyParam], args: &[KeyArg]) -> Option<CacheError> {
    if params.len() == args.len() {
        return None;
    }
    Some(CacheError::KeyGeneration(format!(
        "{} arguments supplied for {} declared parameters",
        args.len(),
        params.len()
    )))
}

fn composite_key(identity: &str, values: &[&KeyArg]) -> String {
    let mut hasher = DefaultHasher::new();
    identity.hash(&mut hasher);
    for arg in values {
        arg.is_canonical().hash(&mut hasher);
        arg.text().hash(&mut hasher);
    }
    format!("composite-{:016x}", hasher.finish())
}
