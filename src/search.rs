//! Search-callback seam for the JMESPath collaborator
//!
//! The engine never interprets query expressions itself. Hosts hand in a
//! [`Search`] implementation, which keeps the query language pluggable and
//! lets hosts register custom functions behind the callback.

use serde_json::Value;
use thiserror::Error;

/// Error produced by a [`Search`] implementation.
///
/// Covers both compile-time problems (bad expression syntax, unknown
/// functions) and evaluation-time problems. The engine routes the message
/// into the error bundle according to the resolved query-validation mode.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SearchError {
    message: String,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A JMESPath search over a JSON document.
///
/// Implemented for any `Fn(&str, &Value) -> Result<Value, SearchError>`, so a
/// plain function or a closure capturing custom-function state both work:
///
/// ```
/// use authzee::search::{Search, SearchError};
/// use serde_json::Value;
///
/// fn constant_true(_expression: &str, _data: &Value) -> Result<Value, SearchError> {
///     Ok(Value::Bool(true))
/// }
///
/// let search: &dyn Search = &constant_true;
/// assert_eq!(search.search("anything", &Value::Null).unwrap(), Value::Bool(true));
/// ```
pub trait Search {
    /// Evaluate `expression` against `data` and return the resulting value.
    fn search(&self, expression: &str, data: &Value) -> Result<Value, SearchError>;
}

impl<F> Search for F
where
    F: Fn(&str, &Value) -> Result<Value, SearchError>,
{
    fn search(&self, expression: &str, data: &Value) -> Result<Value, SearchError> {
        self(expression, data)
    }
}
