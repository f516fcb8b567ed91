//! # Shared Document and Option Types
//!
//! A configuration document has no fixed shape at the type level: it is a
//! JSON object whose validity is checked at runtime against a loaded
//! [`crate::Schema`]. Code that needs a stable key order (validation error
//! order, watch change detection) sorts keys itself rather than relying on
//! serde_json's map backing, which is insertion-ordered under
//! `preserve_order`.

use serde::{Deserialize, Serialize};

/// A named configuration's payload: a JSON object of arbitrary nesting.
pub type ConfigDocument = serde_json::Map<String, serde_json::Value>;

/// Options for [`crate::ConfigSdk::get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Serve from the cache when an entry exists, and store the fetched
    /// document otherwise.
    pub use_cache: bool,
    /// Validate a freshly fetched document against the schema of the same
    /// name. Cached documents are returned as-is.
    pub validate: bool,
}

impl GetOptions {
    /// Uncached, unvalidated fetch.
    pub const FRESH: Self = Self {
        use_cache: false,
        validate: false,
    };

    /// Serve from (and populate) the cache.
    pub fn cached() -> Self {
        Self {
            use_cache: true,
            validate: false,
        }
    }

    /// Builder-style toggle for validation.
    pub fn validated(mut self) -> Self {
        self.validate = true;
        self
    }
}

/// Options for [`crate::ConfigSdk::update`] and [`crate::ConfigSdk::patch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Validate before sending.
    pub validate: bool,
}

impl UpdateOptions {
    pub fn validated() -> Self {
        Self { validate: true }
    }
}

/// Outcome of validating a document against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Build a result from accumulated errors; valid iff none.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert to `Err(SdkError::Validation)` when invalid.
    pub fn into_result(self, name: &str) -> Result<(), crate::SdkError> {
        if self.valid {
            Ok(())
        } else {
            Err(crate::SdkError::Validation {
                name: name.to_string(),
                errors: self.errors,
            })
        }
    }
}

/// Shallow merge: top-level keys of `updates` replace those of `base`.
pub fn shallow_merge(base: &ConfigDocument, updates: &ConfigDocument) -> ConfigDocument {
    let mut merged = base.clone();
    for (key, value) in updates {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
