//! Content-addressed cache of compiled schema validators
//!
//! Compiling a JSON Schema is far more expensive than validating against it,
//! and the same schemas recur on every workflow call: the generated grant and
//! request schemas, and each grant's `context_schema`. Entries are keyed by
//! the schema's serialized content, so a changed definition or grant set can
//! never observe a stale validator.

use std::sync::Arc;

use dashmap::DashMap;
use jsonschema::Validator;
use serde_json::Value;

use crate::error::SchemaCompileError;

/// Compile a schema with the Draft 2020-12 validator.
pub(crate) fn compile(schema: &Value) -> Result<Validator, SchemaCompileError> {
    jsonschema::draft202012::options()
        .build(schema)
        .map_err(|err| SchemaCompileError::new(err.to_string()))
}

/// All violations of `instance` against `validator`, joined into one detail
/// string, or `None` when the instance is valid.
pub(crate) fn violation_detail(validator: &Validator, instance: &Value) -> Option<String> {
    if validator.is_valid(instance) {
        return None;
    }
    let details: Vec<String> = validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    Some(details.join(", "))
}

/// Thread-safe cache of compiled validators.
pub struct ValidatorCache {
    enabled: bool,
    validators: DashMap<String, Arc<Validator>>,
}

impl ValidatorCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            validators: DashMap::new(),
        }
    }

    /// Fetch the validator for `schema`, compiling and caching on a miss.
    ///
    /// Compile failures are returned to the caller and never cached.
    pub fn get_or_compile(&self, schema: &Value) -> Result<Arc<Validator>, SchemaCompileError> {
        if !self.enabled {
            return compile(schema).map(Arc::new);
        }

        let key = schema.to_string();
        if let Some(validator) = self.validators.get(&key) {
            return Ok(validator.clone());
        }

        let validator = Arc::new(compile(schema)?);
        self.validators.insert(key, validator.clone());
        Ok(validator)
    }

    pub fn clear(&self) {
        self.validators.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.validators.len(),
        }
    }
}

impl Default for ValidatorCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached validators.
    pub size: usize,
}
