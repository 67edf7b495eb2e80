//! Workflow engine
//!
//! Sequences the full pipeline for both workflows: definition validation →
//! schema generation → grant validation → request validation → per-grant
//! evaluation. Any stage that records a critical error stops the workflow
//! and returns a response with `completed: false`.

pub mod response;

pub use response::{AuditResponse, AuthorizeResponse};

use tracing::{debug, warn};

use crate::definitions;
use crate::evaluate;
use crate::report::ErrorBundle;
use crate::schema::{self, CacheStats, SchemaSet, ValidatorCache};
use crate::search::Search;
use crate::types::{Effect, Grant, IdentityDefinition, Request, ResourceDefinition};
use crate::validation;

const DENY_APPLICABLE: &str = "A deny grant is applicable; the request is not authorized.";
const ALLOW_APPLICABLE: &str = "An allow grant is applicable to the request, and no deny grants are applicable; the request is authorized.";
const IMPLICIT_DENY: &str = "No applicable grants; implicit deny.";
const WORKFLOW_HALTED: &str = "Workflow halted on critical error.";
const DEFINITIONS_INVALID: &str =
    "One or more identity or resource definitions are not valid; the request is not authorized.";
const GRANTS_INVALID: &str = "One or more grants are not valid; the request is not authorized.";
const REQUEST_INVALID: &str = "The request is not valid; the request is not authorized.";

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cache compiled schema validators across workflow calls. Entries are
    /// content-addressed, so a changed definition or grant set never observes
    /// a stale validator; disabling only trades compile time for memory.
    pub cache_validators: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_validators: true,
        }
    }
}

/// Grant-based authorization engine over one set of definitions.
///
/// The engine holds the identity and resource definitions plus a cache of
/// compiled validators. Definitions are revalidated on every workflow call,
/// so a flawed set surfaces in the response errors rather than at
/// construction time. Workflow calls are synchronous, perform no I/O, and
/// share no mutable state, so one engine may serve many threads.
pub struct Engine {
    identity_defs: Vec<IdentityDefinition>,
    resource_defs: Vec<ResourceDefinition>,
    validators: ValidatorCache,
}

/// Which prelude stage failed, with the errors it produced.
struct PreludeFailure {
    errors: ErrorBundle,
    message: &'static str,
}

impl Engine {
    pub fn new(
        identity_defs: Vec<IdentityDefinition>,
        resource_defs: Vec<ResourceDefinition>,
    ) -> Self {
        Self::with_config(identity_defs, resource_defs, EngineConfig::default())
    }

    pub fn with_config(
        identity_defs: Vec<IdentityDefinition>,
        resource_defs: Vec<ResourceDefinition>,
        config: EngineConfig,
    ) -> Self {
        Self {
            identity_defs,
            resource_defs,
            validators: ValidatorCache::new(config.cache_validators),
        }
    }

    pub fn identity_definitions(&self) -> &[IdentityDefinition] {
        &self.identity_defs
    }

    pub fn resource_definitions(&self) -> &[ResourceDefinition] {
        &self.resource_defs
    }

    /// Generate the schema set for this engine's definitions.
    ///
    /// Pure with respect to the definitions: repeated calls return byte-equal
    /// schemas.
    pub fn schemas(&self) -> SchemaSet {
        schema::generate_schemas(&self.identity_defs, &self.resource_defs)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.validators.stats()
    }

    pub fn clear_validator_cache(&self) {
        self.validators.clear();
    }

    /// Audit workflow: collect every applicable grant in input order.
    pub fn audit(&self, grants: &[Grant], request: &Request, search: &dyn Search) -> AuditResponse {
        let mut response = AuditResponse {
            completed: true,
            grants: Vec::new(),
            errors: ErrorBundle::default(),
        };

        if let Err(failure) = self.prelude(grants, request) {
            response.completed = false;
            response.errors = failure.errors;
            return response;
        }

        debug!(
            "audit workflow: evaluating {} grants for action '{}'",
            grants.len(),
            request.action
        );

        for grant in grants {
            let evaluation = evaluate::evaluate_grant(request, grant, search, &self.validators);
            response.errors.context.extend(evaluation.context_errors);
            response.errors.jmespath.extend(evaluation.jmespath_errors);

            if evaluation.halt {
                warn!("audit workflow halted on critical error");
                response.completed = false;
                return response;
            }

            if evaluation.applicable {
                response.grants.push(grant.clone());
            }
        }

        debug!(
            "audit workflow complete: {} applicable grants",
            response.grants.len()
        );
        response
    }

    /// Authorize workflow: a single allow/deny decision.
    ///
    /// Deny grants are evaluated first and short-circuit on the first
    /// applicable one; only when no deny applies can an allow grant authorize
    /// the request. No applicable grant at all is an implicit deny.
    pub fn authorize(
        &self,
        grants: &[Grant],
        request: &Request,
        search: &dyn Search,
    ) -> AuthorizeResponse {
        let mut errors = ErrorBundle::default();

        if let Err(failure) = self.prelude(grants, request) {
            return AuthorizeResponse {
                authorized: false,
                completed: false,
                grant: None,
                message: failure.message.to_string(),
                errors: failure.errors,
            };
        }

        debug!(
            "authorize workflow: evaluating {} grants for action '{}'",
            grants.len(),
            request.action
        );

        for effect in [Effect::Deny, Effect::Allow] {
            for grant in grants.iter().filter(|grant| grant.effect == effect) {
                let evaluation = evaluate::evaluate_grant(request, grant, search, &self.validators);
                errors.context.extend(evaluation.context_errors);
                errors.jmespath.extend(evaluation.jmespath_errors);

                if evaluation.halt {
                    warn!("authorize workflow halted on critical error");
                    return AuthorizeResponse {
                        authorized: false,
                        completed: false,
                        grant: None,
                        message: WORKFLOW_HALTED.to_string(),
                        errors,
                    };
                }

                if evaluation.applicable {
                    let (authorized, message) = match effect {
                        Effect::Deny => (false, DENY_APPLICABLE),
                        Effect::Allow => (true, ALLOW_APPLICABLE),
                    };
                    debug!(
                        "authorize workflow decided: authorized={} by {:?} grant",
                        authorized, effect
                    );
                    return AuthorizeResponse {
                        authorized,
                        completed: true,
                        grant: Some(grant.clone()),
                        message: message.to_string(),
                        errors,
                    };
                }
            }
        }

        debug!("authorize workflow: no applicable grants, implicit deny");
        AuthorizeResponse {
            authorized: false,
            completed: true,
            grant: None,
            message: IMPLICIT_DENY.to_string(),
            errors,
        }
    }

    /// Shared workflow prelude: validate definitions, generate schemas, then
    /// validate grants and the request.
    ///
    /// Definition errors stop everything else. Grant and request validation
    /// both run even when one of them fails, so a halted response reports
    /// every input problem at once.
    fn prelude(&self, grants: &[Grant], request: &Request) -> Result<(), PreludeFailure> {
        let mut errors = ErrorBundle::default();

        errors.definition =
            definitions::validate_definitions(&self.identity_defs, &self.resource_defs);
        if !errors.definition.is_empty() {
            warn!(
                "workflow stopped: {} definition errors",
                errors.definition.len()
            );
            return Err(PreludeFailure {
                errors,
                message: DEFINITIONS_INVALID,
            });
        }

        let schemas = schema::generate_schemas(&self.identity_defs, &self.resource_defs);

        errors.grant = validation::validate_grants(grants, &schemas.grant, &self.validators);
        errors.request = validation::validate_request(request, &schemas.request, &self.validators);

        if !errors.grant.is_empty() {
            warn!("workflow stopped: {} grant errors", errors.grant.len());
            return Err(PreludeFailure {
                errors,
                message: GRANTS_INVALID,
            });
        }
        if !errors.request.is_empty() {
            warn!("workflow stopped: request is not valid");
            return Err(PreludeFailure {
                errors,
                message: REQUEST_INVALID,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;
    use crate::types::{
        ContextValidation, ContextValidationOverride, QueryValidation, QueryValidationOverride,
    };
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn engine() -> Engine {
        Engine::new(
            vec![IdentityDefinition {
                identity_type: "User".to_string(),
                schema: json!({"type": "object"}),
            }],
            vec![ResourceDefinition {
                resource_type: "Balloon".to_string(),
                actions: vec!["pop".to_string(), "inflate".to_string()],
                schema: json!({"type": "object"}),
                parent_types: Vec::new(),
                child_types: Vec::new(),
            }],
        )
    }

    fn grant(effect: Effect, query: &str) -> Grant {
        Grant {
            effect,
            actions: vec!["pop".to_string()],
            query: query.to_string(),
            query_validation: QueryValidation::Error,
            equality: json!(true),
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

    // stub search: the query string itself selects the outcome
    fn stub_search(expression: &str, _data: &Value) -> Result<Value, SearchError> {
        match expression {
            "yes" => Ok(json!(true)),
            "no" => Ok(json!(false)),
            _ => Err(SearchError::new(format!("bad expression: {expression}"))),
        }
    }

    #[test]
    fn test_invalid_definitions_stop_both_workflows() {
        let engine = Engine::new(
            Vec::new(),
            vec![ResourceDefinition {
                resource_type: "Balloon".to_string(),
                actions: Vec::new(),
                schema: json!({"type": "object"}),
                parent_types: Vec::new(),
                child_types: Vec::new(),
            }],
        );

        let audit = engine.audit(&[], &request(), &stub_search);
        assert!(!audit.completed);
        assert!(audit.grants.is_empty());
        assert_eq!(audit.errors.definition.len(), 1);

        let authorize = engine.authorize(&[], &request(), &stub_search);
        assert!(!authorize.completed);
        assert!(!authorize.authorized);
        assert!(authorize.grant.is_none());
        assert!(authorize.message.contains("definitions are not valid"));
    }

    #[test]
    fn test_invalid_grant_stops_workflows_with_grant_errors() {
        let engine = engine();
        let mut bad = grant(Effect::Allow, "yes");
        bad.actions = vec!["launch".to_string()];

        let authorize = engine.authorize(&[bad], &request(), &stub_search);
        assert!(!authorize.completed);
        assert_eq!(authorize.errors.grant.len(), 1);
        assert!(authorize.message.contains("grants are not valid"));
    }

    #[test]
    fn test_grant_and_request_problems_are_reported_together() {
        let engine = engine();
        let mut bad_grant = grant(Effect::Allow, "yes");
        bad_grant.actions = vec!["launch".to_string()];
        let mut bad_request = request();
        bad_request.action = "launch".to_string();

        let response = engine.authorize(&[bad_grant], &bad_request, &stub_search);
        assert!(!response.completed);
        assert_eq!(response.errors.grant.len(), 1);
        assert_eq!(response.errors.request.len(), 1);
        assert!(response.message.contains("grants are not valid"));
    }

    #[test]
    fn test_invalid_request_stops_workflows_with_request_error() {
        let engine = engine();
        let mut bad = request();
        bad.resource_type = "Rocket".to_string();

        let audit = engine.audit(&[grant(Effect::Allow, "yes")], &bad, &stub_search);
        assert!(!audit.completed);
        assert_eq!(audit.errors.request.len(), 1);
    }

    #[test]
    fn test_authorize_allow_and_implicit_deny() {
        let engine = engine();
        let allow = grant(Effect::Allow, "yes");

        let hit = engine.authorize(&[allow.clone()], &request(), &stub_search);
        assert!(hit.authorized);
        assert!(hit.completed);
        assert_eq!(hit.grant.as_ref(), Some(&allow));

        let miss = engine.authorize(&[grant(Effect::Allow, "no")], &request(), &stub_search);
        assert!(!miss.authorized);
        assert!(miss.completed);
        assert!(miss.grant.is_none());
        assert_eq!(miss.message, IMPLICIT_DENY);
    }

    #[test]
    fn test_deny_is_checked_before_allow_regardless_of_order() {
        let engine = engine();
        let allow = grant(Effect::Allow, "yes");
        let deny = grant(Effect::Deny, "yes");

        // allow listed first, deny still wins
        let response = engine.authorize(&[allow, deny.clone()], &request(), &stub_search);
        assert!(!response.authorized);
        assert!(response.completed);
        assert_eq!(response.grant.as_ref(), Some(&deny));
        assert_eq!(response.message, DENY_APPLICABLE);
    }

    #[test]
    fn test_audit_collects_in_input_order_and_halts_on_critical() {
        let engine = engine();
        let first = grant(Effect::Allow, "yes");
        let second = grant(Effect::Deny, "yes");
        let miss = grant(Effect::Allow, "no");

        let response = engine.audit(
            &[first.clone(), miss, second.clone()],
            &request(),
            &stub_search,
        );
        assert!(response.completed);
        assert_eq!(response.grants, vec![first.clone(), second]);

        // a critical query error stops the scan before later grants
        let mut critical = grant(Effect::Allow, "boom");
        critical.query_validation = QueryValidation::Critical;
        let response = engine.audit(&[critical, first], &request(), &stub_search);
        assert!(!response.completed);
        assert!(response.grants.is_empty());
        assert_eq!(response.errors.jmespath.len(), 1);
        assert!(response.errors.jmespath[0].critical);
    }

    #[test]
    fn test_authorize_halt_reports_no_grant() {
        let engine = engine();
        let mut critical = grant(Effect::Deny, "boom");
        critical.query_validation = QueryValidation::Critical;

        let response = engine.authorize(&[critical], &request(), &stub_search);
        assert!(!response.completed);
        assert!(!response.authorized);
        assert!(response.grant.is_none());
        assert_eq!(response.message, WORKFLOW_HALTED);
    }

    #[test]
    fn test_validator_cache_fills_during_workflows() {
        let engine = engine();
        engine.authorize(&[grant(Effect::Allow, "yes")], &request(), &stub_search);
        assert!(engine.cache_stats().size >= 2);

        engine.clear_validator_cache();
        assert_eq!(engine.cache_stats().size, 0);
    }
}
