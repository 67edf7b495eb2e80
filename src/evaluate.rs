//! Per-grant evaluation
//!
//! A grant passes through a small state machine: the action gate, the
//! context check under the resolved context-validation mode, then the query
//! whose result must equal the grant's `equality` value. Failures along the
//! way make the grant inapplicable and, depending on the resolved mode, may
//! record an error or halt the whole workflow.

use serde_json::json;

use crate::compare::json_equal;
use crate::report::{ContextError, JmesPathError};
use crate::schema::{cache, ValidatorCache};
use crate::search::Search;
use crate::types::{ContextValidation, Grant, QueryValidation, Request};

/// Outcome of evaluating one grant against a request.
///
/// The evaluator only ever records context and JMESPath errors; the caller
/// merges them into the response bundle in observation order.
#[derive(Debug, Clone, Default)]
pub struct GrantEvaluation {
    /// The grant applies to the request.
    pub applicable: bool,
    /// A critical error was recorded and the workflow must stop.
    pub halt: bool,
    pub context_errors: Vec<ContextError>,
    pub jmespath_errors: Vec<JmesPathError>,
}

/// Evaluate a single validated grant against a validated request.
pub fn evaluate_grant(
    request: &Request,
    grant: &Grant,
    search: &dyn Search,
    validators: &ValidatorCache,
) -> GrantEvaluation {
    let mut evaluation = GrantEvaluation::default();

    if !grant.covers_action(&request.action) {
        return evaluation;
    }

    let context_mode = request.context_validation.resolve(grant.context_validation);
    if context_mode != ContextValidation::None {
        if let Some(detail) = context_violation(request, grant, validators) {
            let critical = context_mode == ContextValidation::Critical;
            if critical || context_mode == ContextValidation::Error {
                evaluation.context_errors.push(ContextError {
                    message: detail,
                    critical,
                    grant: grant.clone(),
                });
                evaluation.halt = critical;
            }
            return evaluation;
        }
    }

    let input = json!({
        "grant": grant,
        "request": request
    });

    match search.search(&grant.query, &input) {
        Ok(result) => {
            evaluation.applicable = json_equal(&result, &grant.equality);
        }
        Err(err) => {
            let query_mode = request.query_validation.resolve(grant.query_validation);
            let critical = query_mode == QueryValidation::Critical;
            if critical || query_mode == QueryValidation::Error {
                evaluation.jmespath_errors.push(JmesPathError {
                    message: err.to_string(),
                    critical,
                    grant: grant.clone(),
                });
                evaluation.halt = critical;
            }
        }
    }

    evaluation
}

/// Check the request context against the grant's context schema.
///
/// A context schema that fails to compile counts as a violation and is
/// routed through the same validation-mode policy.
fn context_violation(
    request: &Request,
    grant: &Grant,
    validators: &ValidatorCache,
) -> Option<String> {
    let validator = match validators.get_or_compile(&grant.context_schema) {
        Ok(validator) => validator,
        Err(err) => return Some(err.to_string()),
    };
    let context = serde_json::to_value(&request.context).unwrap_or_default();
    cache::violation_detail(&validator, &context)
}
