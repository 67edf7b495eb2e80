//! Grant and request validation against the generated schemas
//!
//! Both checks run with the external Draft 2020-12 validator. Failures are
//! always critical: a workflow never evaluates grants it could not validate.

use serde_json::Value;

use crate::report::{GrantError, RequestError};
use crate::schema::{cache, ValidatorCache};
use crate::types::{Grant, Request};

/// Validate every grant against the generated grant schema.
///
/// Produces one critical error per failing grant, carrying the raw grant.
pub fn validate_grants(
    grants: &[Grant],
    schema: &Value,
    validators: &ValidatorCache,
) -> Vec<GrantError> {
    let validator = match validators.get_or_compile(schema) {
        Ok(validator) => validator,
        Err(err) => {
            return vec![GrantError {
                message: format!("The grant schema failed to compile: {}", err.message()),
                critical: true,
                grant: Value::Null,
            }];
        }
    };

    let mut errors = Vec::new();
    for grant in grants {
        let raw = serde_json::to_value(grant).unwrap_or_default();
        if let Some(detail) = cache::violation_detail(&validator, &raw) {
            errors.push(GrantError {
                message: format!("The grant is not valid. Schema error: {detail}"),
                critical: true,
                grant: raw,
            });
        }
    }

    errors
}

/// Validate the request against the generated request schema.
///
/// Structural violations are coalesced into a single critical error.
pub fn validate_request(
    request: &Request,
    schema: &Value,
    validators: &ValidatorCache,
) -> Vec<RequestError> {
    let validator = match validators.get_or_compile(schema) {
        Ok(validator) => validator,
        Err(err) => {
            return vec![RequestError {
                message: format!("The request schema failed to compile: {}", err.message()),
                critical: true,
            }];
        }
    };

    let raw = serde_json::to_value(request).unwrap_or_default();
    match cache::violation_detail(&validator, &raw) {
        Some(detail) => vec![RequestError {
            message: format!("The request is not valid for the request schema: {detail}"),
            critical: true,
        }],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::generate_schemas;
    use crate::types::{
        ContextValidation, ContextValidationOverride, Effect, IdentityDefinition, QueryValidation,
        QueryValidationOverride, ResourceDefinition,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn definitions() -> (Vec<IdentityDefinition>, Vec<ResourceDefinition>) {
        let identities = vec![IdentityDefinition {
            identity_type: "User".to_string(),
            schema: json!({
                "type": "object",
                "properties": {"role": {"type": "string"}},
                "required": ["role"]
            }),
        }];
        let resources = vec![ResourceDefinition {
            resource_type: "Balloon".to_string(),
            actions: vec!["pop".to_string(), "inflate".to_string()],
            schema: json!({"type": "object"}),
            parent_types: Vec::new(),
            child_types: Vec::new(),
        }];
        (identities, resources)
    }

    fn grant(actions: &[&str]) -> Grant {
        Grant {
            effect: Effect::Allow,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            query: "request.action".to_string(),
            query_validation: QueryValidation::Error,
            equality: json!("pop"),
            data: json!({}),
            context_schema: json!({"type": "object"}),
            context_validation: ContextValidation::None,
        }
    }

    fn request() -> Request {
        let mut identities = BTreeMap::new();
        identities.insert("User".to_string(), vec![json!({"role": "admin"})]);
        Request {
            identities,
            resource_type: "Balloon".to_string(),
            action: "pop".to_string(),
            resource: json!({"id": "b-1"}),
            parents: BTreeMap::new(),
            children: BTreeMap::new(),
            query_validation: QueryValidationOverride::Grant,
            context: BTreeMap::new(),
            context_validation: ContextValidationOverride::Grant,
        }
    }

    #[test]
    fn test_conforming_grants_pass() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let grants = vec![grant(&["pop"]), grant(&[])];
        let errors = validate_grants(&grants, &schemas.grant, &validators);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_grant_with_undefined_action_is_rejected() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let grants = vec![grant(&["pop"]), grant(&["launch"])];
        let errors = validate_grants(&grants, &schemas.grant, &validators);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].critical);
        assert_eq!(errors[0].grant["actions"], json!(["launch"]));
        assert!(errors[0].message.contains("The grant is not valid"));
    }

    #[test]
    fn test_grant_with_nonobject_data_is_rejected() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut bad = grant(&["pop"]);
        bad.data = json!("not an object");
        let errors = validate_grants(&[bad], &schemas.grant, &validators);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_conforming_request_passes() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let errors = validate_request(&request(), &schemas.request, &validators);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_request_with_wrong_action_is_rejected() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut bad = request();
        bad.action = "launch".to_string();
        let errors = validate_request(&bad, &schemas.request, &validators);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].critical);
    }

    #[test]
    fn test_request_missing_identity_type_is_rejected() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut bad = request();
        bad.identities.clear();
        let errors = validate_request(&bad, &schemas.request, &validators);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_request_with_undeclared_parent_type_is_rejected() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut bad = request();
        bad.parents
            .insert("Store".to_string(), vec![json!({"id": "s-1"})]);
        let errors = validate_request(&bad, &schemas.request, &validators);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_request_context_keys_are_restricted() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut bad = request();
        bad.context.insert("not a key!".to_string(), json!(1));
        let errors = validate_request(&bad, &schemas.request, &validators);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_identity_sequence_is_valid() {
        let (identities, resources) = definitions();
        let schemas = generate_schemas(&identities, &resources);
        let validators = ValidatorCache::default();

        let mut req = request();
        req.identities.insert("User".to_string(), Vec::new());
        let errors = validate_request(&req, &schemas.request, &validators);
        assert!(errors.is_empty());
    }
}
