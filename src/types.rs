//! Core authorization types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Effect of an applicable grant on the authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Authorize the request, provided no deny grant is applicable.
    Allow,
    /// Refuse the request whenever the grant is applicable.
    Deny,
}

/// Grant-level treatment of search-callback failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryValidation {
    /// Query errors only make the grant inapplicable.
    Validate,
    /// Also record a non-critical error in the result.
    Error,
    /// Also record a critical error and exit the workflow early.
    Critical,
}

/// Grant-level treatment of the request context check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextValidation {
    /// The context is not checked against the grant's context schema.
    None,
    /// An invalid context only makes the grant inapplicable.
    Validate,
    /// Also record a non-critical error in the result.
    Error,
    /// Also record a critical error and exit the workflow early.
    Critical,
}

/// Request-level override of [`QueryValidation`].
///
/// `Grant` defers to whatever each grant configures for itself; any other
/// variant applies to every grant evaluated for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryValidationOverride {
    Grant,
    Validate,
    Error,
    Critical,
}

impl QueryValidationOverride {
    /// Resolve the effective mode for one grant.
    pub fn resolve(self, grant_level: QueryValidation) -> QueryValidation {
        match self {
            Self::Grant => grant_level,
            Self::Validate => QueryValidation::Validate,
            Self::Error => QueryValidation::Error,
            Self::Critical => QueryValidation::Critical,
        }
    }
}

/// Request-level override of [`ContextValidation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextValidationOverride {
    Grant,
    None,
    Validate,
    Error,
    Critical,
}

impl ContextValidationOverride {
    /// Resolve the effective mode for one grant.
    pub fn resolve(self, grant_level: ContextValidation) -> ContextValidation {
        match self {
            Self::Grant => grant_level,
            Self::None => ContextValidation::None,
            Self::Validate => ContextValidation::Validate,
            Self::Error => ContextValidation::Error,
            Self::Critical => ContextValidation::Critical,
        }
    }
}

/// Which kind of definition produced a definition error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionType {
    Identity,
    Resource,
}

/// Defines a type of identity that requests may present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityDefinition {
    /// Unique identity type name, `[A-Za-z0-9_]`, at most 256 characters.
    pub identity_type: String,

    /// JSON Schema every presented identity of this type must satisfy.
    pub schema: Value,
}

/// Defines a type of resource, its actions, and its place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Unique resource type name, `[A-Za-z0-9_]`, at most 256 characters.
    pub resource_type: String,

    /// Actions that may be requested on this resource type.
    /// The `ResourceType:action` naming pattern is common but not required.
    pub actions: Vec<String>,

    /// JSON Schema instances of this resource type must satisfy.
    pub schema: Value,

    /// Resource types that are parents of this one. Each must name another
    /// resource definition in the same set.
    pub parent_types: Vec<String>,

    /// Resource types that are children of this one.
    pub child_types: Vec<String>,
}

/// An enacted authorization rule.
///
/// A grant is *applicable* to a request when its action filter passes, the
/// request context satisfies `context_schema` (per the resolved validation
/// mode), and running `query` through the search callback yields a value
/// equal to `equality`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub effect: Effect,

    /// Actions this grant applies to. Empty matches every action of every
    /// defined resource type.
    pub actions: Vec<String>,

    /// JMESPath query run against `{"grant": <grant>, "request": <request>}`.
    pub query: String,

    pub query_validation: QueryValidation,

    /// Expected query result. The grant is applicable when the query result
    /// equals this value under type-strict JSON equality.
    pub equality: Value,

    /// Opaque data exposed to the query, so rule parameters do not have to be
    /// embedded in the query text.
    pub data: Value,

    /// JSON Schema the request context is checked against.
    pub context_schema: Value,

    pub context_validation: ContextValidation,
}

impl Grant {
    /// Action filter: an empty `actions` list matches every action.
    pub fn covers_action(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.iter().any(|a| a == action)
    }
}

/// One authorization question: identities acting on a resource with an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Identities of the caller, keyed by identity type. Every defined
    /// identity type must be present; types the caller does not hold map to
    /// empty sequences.
    pub identities: BTreeMap<String, Vec<Value>>,

    pub resource_type: String,

    pub action: String,

    /// The resource instance, shaped by its definition's schema.
    pub resource: Value,

    /// Parent instances, keyed by exactly the parent types the resource
    /// definition declares.
    pub parents: BTreeMap<String, Vec<Value>>,

    /// Child instances, keyed by exactly the declared child types.
    pub children: BTreeMap<String, Vec<Value>>,

    pub query_validation: QueryValidationOverride,

    /// Caller-supplied context data, keys `[a-zA-Z0-9_]`, at most 256
    /// characters each.
    pub context: BTreeMap<String, Value>,

    pub context_validation: ContextValidationOverride,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effect_wire_names() {
        assert_eq!(serde_json::to_value(Effect::Allow).unwrap(), json!("allow"));
        assert_eq!(serde_json::to_value(Effect::Deny).unwrap(), json!("deny"));
    }

    #[test]
    fn test_validation_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(ContextValidation::None).unwrap(),
            json!("none")
        );
        assert_eq!(
            serde_json::to_value(QueryValidationOverride::Grant).unwrap(),
            json!("grant")
        );
        let parsed: ContextValidationOverride = serde_json::from_value(json!("critical")).unwrap();
        assert_eq!(parsed, ContextValidationOverride::Critical);
    }

    #[test]
    fn test_query_override_resolution() {
        assert_eq!(
            QueryValidationOverride::Grant.resolve(QueryValidation::Error),
            QueryValidation::Error
        );
        assert_eq!(
            QueryValidationOverride::Critical.resolve(QueryValidation::Validate),
            QueryValidation::Critical
        );
    }

    #[test]
    fn test_context_override_resolution() {
        assert_eq!(
            ContextValidationOverride::Grant.resolve(ContextValidation::Critical),
            ContextValidation::Critical
        );
        assert_eq!(
            ContextValidationOverride::None.resolve(ContextValidation::Error),
            ContextValidation::None
        );
    }

    #[test]
    fn test_empty_actions_cover_everything() {
        let grant = Grant {
            effect: Effect::Allow,
            actions: Vec::new(),
            query: "`true`".to_string(),
            query_validation: QueryValidation::Validate,
            equality: json!(true),
            data: json!({}),
            context_schema: json!({"type": "object"}),
            context_validation: ContextValidation::None,
        };
        assert!(grant.covers_action("pop"));
        assert!(grant.covers_action("anything_at_all"));
    }

    #[test]
    fn test_action_filter_is_exact() {
        let grant = Grant {
            effect: Effect::Deny,
            actions: vec!["pop".to_string()],
            query: "`true`".to_string(),
            query_validation: QueryValidation::Validate,
            equality: json!(true),
            data: json!({}),
            context_schema: json!({"type": "object"}),
            context_validation: ContextValidation::None,
        };
        assert!(grant.covers_action("pop"));
        assert!(!grant.covers_action("po"));
        assert!(!grant.covers_action("inflate"));
    }
}
