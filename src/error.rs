//! Error types for the authorization engine

use thiserror::Error;

/// A JSON Schema document was rejected by the Draft 2020-12 compiler.
///
/// Raised for grant `context_schema` documents and for generated schemas that
/// embed host-supplied definition schemas. Workflow code never surfaces this
/// directly; it is folded into the error bundle of the response.
#[derive(Debug, Clone, Error)]
#[error("schema failed to compile: {message}")]
pub struct SchemaCompileError {
    message: String,
}

impl SchemaCompileError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Detail reported by the schema compiler.
    pub fn message(&self) -> &str {
        &self.message
    }
}
