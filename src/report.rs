//! Workflow error reporting
//!
//! Every failure observed by the pipeline is recorded as data rather than
//! raised: each component appends entries of its own kind to an
//! [`ErrorBundle`] carried on the response. An entry with `critical: true`
//! is what forces a workflow to stop early.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{DefinitionType, Grant};

/// The request context did not satisfy a grant's context schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextError {
    /// Detailed message about what caused the error.
    pub message: String,
    /// Whether this error caused the workflow to exit early.
    pub critical: bool,
    /// The grant whose context schema rejected the context.
    pub grant: Grant,
}

/// An identity or resource definition was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionError {
    pub message: String,
    pub critical: bool,
    pub definition_type: DefinitionType,
    /// The raw definition as submitted.
    pub definition: Value,
}

/// A grant did not validate against the generated grant schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantError {
    pub message: String,
    pub critical: bool,
    /// The raw grant as submitted.
    pub grant: Value,
}

/// The search callback failed for a grant's query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JmesPathError {
    pub message: String,
    pub critical: bool,
    /// The grant whose query failed.
    pub grant: Grant,
}

/// The request did not validate against the generated request schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestError {
    pub message: String,
    pub critical: bool,
}

/// All errors observed by a workflow, one array per kind.
///
/// Arrays are always present and hold entries in observation order. Only the
/// definition validator writes `definition`, only grant-schema validation
/// writes `grant`, only request-schema validation writes `request`, and only
/// grant evaluation writes `context` and `jmespath`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBundle {
    pub context: Vec<ContextError>,
    pub definition: Vec<DefinitionError>,
    pub grant: Vec<GrantError>,
    pub jmespath: Vec<JmesPathError>,
    pub request: Vec<RequestError>,
}

impl ErrorBundle {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
            && self.definition.is_empty()
            && self.grant.is_empty()
            && self.jmespath.is_empty()
            && self.request.is_empty()
    }

    /// Whether any entry would have halted the workflow.
    pub fn has_critical(&self) -> bool {
        self.context.iter().any(|e| e.critical)
            || self.definition.iter().any(|e| e.critical)
            || self.grant.iter().any(|e| e.critical)
            || self.jmespath.iter().any(|e| e.critical)
            || self.request.iter().any(|e| e.critical)
    }
}
