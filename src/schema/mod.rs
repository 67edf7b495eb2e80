//! Schema generation from identity and resource definitions
//!
//! Given validated definitions, the generator derives the runtime schemas:
//! the grant schema (action enum drawn from the definitions), the errors
//! schema, the request schema (one `anyOf` branch per resource type), and the
//! two workflow response schemas. Generation is pure; identical definitions
//! produce byte-equal output, with array ordering fixed by definition input
//! order and sorted `required` lists.

pub mod cache;
pub(crate) mod templates;

pub use cache::{CacheStats, ValidatorCache};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::{IdentityDefinition, ResourceDefinition};

/// The generated schemas for one definition set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    /// Validates submitted grants.
    pub grant: Value,
    /// Describes the error bundle carried on responses.
    pub errors: Value,
    /// Validates workflow requests.
    pub request: Value,
    /// Describes the audit workflow response.
    pub audit: Value,
    /// Describes the authorize workflow response.
    pub authorize: Value,
}

/// Generate all runtime schemas for the given definitions.
pub fn generate_schemas(
    identity_defs: &[IdentityDefinition],
    resource_defs: &[ResourceDefinition],
) -> SchemaSet {
    let grant = grant_schema(resource_defs);
    let errors = errors_schema(&grant);
    let request = request_schema(identity_defs, resource_defs);
    let audit = audit_response_schema(&grant);
    let authorize = authorize_response_schema(&grant);

    SchemaSet {
        grant,
        errors,
        request,
        audit,
        authorize,
    }
}

/// Union of all defined actions, deduplicated preserving first occurrence.
pub fn action_union(resource_defs: &[ResourceDefinition]) -> Vec<String> {
    let mut union: Vec<String> = Vec::new();
    for def in resource_defs {
        for action in &def.actions {
            if !union.iter().any(|known| known == action) {
                union.push(action.clone());
            }
        }
    }
    union
}

fn grant_schema(resource_defs: &[ResourceDefinition]) -> Value {
    let mut action_items = templates::action_token();
    action_items["enum"] = json!(action_union(resource_defs));

    let mut context_schema = templates::schema_document();
    context_schema["description"] =
        json!("JSON Schema the request context is validated against for this grant.");

    json!({
        "title": "Grant",
        "description": "A grant is an object representing an enacted authorization rule.",
        "type": "object",
        "additionalProperties": false,
        "required": [
            "effect",
            "actions",
            "query",
            "query_validation",
            "equality",
            "data",
            "context_schema",
            "context_validation"
        ],
        "properties": {
            "effect": {
                "type": "string",
                "enum": ["allow", "deny"],
                "description": "Any applicable deny grant will always cause the request to be not authorized. If there are no applicable deny grants, and there is an applicable allow grant, the request is authorized. If there are no applicable allow or deny grants, requests are implicitly denied and not authorized."
            },
            "actions": {
                "type": "array",
                "uniqueItems": true,
                "items": action_items,
                "description": "List of actions this grant applies to, or empty to match any resource action."
            },
            "query": {
                "type": "string",
                "description": "JMESPath query to run on the authorization data. {\"grant\": <grant>, \"request\": <request>}"
            },
            "query_validation": {
                "type": "string",
                "enum": ["validate", "error", "critical"],
                "description": "Set how query errors are treated. 'validate' - query errors cause the grant to be inapplicable to the request. 'error' - includes the 'validate' checks, and also adds errors to the result. 'critical' - includes the 'error' checks, and flags the error as critical, exiting the workflow early."
            },
            "equality": {
                "description": "Expected value for the query to return. If the query result matches this value the grant is considered applicable to the request."
            },
            "data": {
                "type": "object",
                "description": "Data that is made available at query time for the grant evaluation. Easy place to store data so it doesn't have to be embedded in the query."
            },
            "context_schema": context_schema,
            "context_validation": {
                "type": "string",
                "enum": ["none", "validate", "error", "critical"],
                "description": "Set how the request context is validated against the grant context schema. 'none' - there is no validation. 'validate' - if the context is invalid, the grant is not applicable to the request. 'error' - includes the 'validate' checks, and also adds errors to the result. 'critical' - includes the 'error' checks, and flags the error as critical, exiting the workflow early."
            }
        }
    })
}

fn errors_schema(grant: &Value) -> Value {
    let mut schema = templates::errors_body();
    schema["$defs"] = json!({ "grant": grant });
    schema
}

fn request_schema(
    identity_defs: &[IdentityDefinition],
    resource_defs: &[ResourceDefinition],
) -> Value {
    let mut defs = Map::new();
    defs.insert("identities".to_string(), identities_def(identity_defs));
    defs.insert(
        "query_validation".to_string(),
        templates::query_validation_def(),
    );
    defs.insert("context".to_string(), templates::context_def());
    defs.insert(
        "context_validation".to_string(),
        templates::context_validation_def(),
    );

    let mut branches: Vec<Value> = Vec::with_capacity(resource_defs.len());
    for def in resource_defs {
        defs.insert(def.resource_type.clone(), def.schema.clone());
        branches.push(resource_branch(def));
    }

    json!({
        "title": "Workflow Request",
        "description": "Request for an authorization workflow.",
        "anyOf": branches,
        "$defs": defs
    })
}

fn identities_def(identity_defs: &[IdentityDefinition]) -> Value {
    let mut required: Vec<&str> = identity_defs
        .iter()
        .map(|def| def.identity_type.as_str())
        .collect();
    required.sort_unstable();
    required.dedup();

    let schema_by_type: HashMap<&str, &Value> = identity_defs
        .iter()
        .map(|def| (def.identity_type.as_str(), &def.schema))
        .collect();

    let mut properties = Map::new();
    for identity_type in &required {
        properties.insert(
            (*identity_type).to_string(),
            json!({
                "type": "array",
                "items": schema_by_type[identity_type]
            }),
        );
    }

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": required,
        "properties": properties
    })
}

fn resource_branch(def: &ResourceDefinition) -> Value {
    json!({
        "title": format!("'{}' Resource Type Workflow Request", def.resource_type),
        "description": format!(
            "'{}' resource type request for an authorization workflow.",
            def.resource_type
        ),
        "type": "object",
        "additionalProperties": false,
        "required": [
            "identities",
            "resource_type",
            "action",
            "resource",
            "parents",
            "children",
            "query_validation",
            "context",
            "context_validation"
        ],
        "properties": {
            "identities": {"$ref": "#/$defs/identities"},
            "resource_type": {"const": def.resource_type},
            "action": {
                "type": "string",
                "enum": def.actions
            },
            "resource": {"$ref": format!("#/$defs/{}", def.resource_type)},
            "parents": relation_object(&def.parent_types),
            "children": relation_object(&def.child_types),
            "query_validation": {"$ref": "#/$defs/query_validation"},
            "context": {"$ref": "#/$defs/context"},
            "context_validation": {"$ref": "#/$defs/context_validation"}
        }
    })
}

/// `parents`/`children` object: exactly the declared relation types, each an
/// array of instances of that type.
fn relation_object(relation_types: &[String]) -> Value {
    let mut required: Vec<&str> = relation_types.iter().map(String::as_str).collect();
    required.sort_unstable();
    required.dedup();

    let mut properties = Map::new();
    for relation_type in &required {
        properties.insert(
            (*relation_type).to_string(),
            json!({
                "type": "array",
                "items": {"$ref": format!("#/$defs/{relation_type}")}
            }),
        );
    }

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": required,
        "properties": properties
    })
}

fn audit_response_schema(grant: &Value) -> Value {
    json!({
        "title": "Audit Response",
        "description": "Response for the audit workflow.",
        "type": "object",
        "additionalProperties": false,
        "required": ["completed", "grants", "errors"],
        "properties": {
            "completed": {
                "type": "boolean",
                "description": "The workflow completed."
            },
            "grants": {
                "type": "array",
                "items": {"$ref": "#/$defs/grant"},
                "description": "List of grants that are applicable to the request."
            },
            "errors": templates::errors_body()
        },
        "$defs": {"grant": grant}
    })
}

fn authorize_response_schema(grant: &Value) -> Value {
    json!({
        "title": "Authorize Response",
        "description": "Response for the authorize workflow.",
        "type": "object",
        "additionalProperties": false,
        "required": ["authorized", "completed", "grant", "message", "errors"],
        "properties": {
            "authorized": {
                "type": "boolean",
                "description": "true if the request is authorized. false if it is not authorized."
            },
            "completed": {
                "type": "boolean",
                "description": "The workflow completed."
            },
            "grant": {
                "description": "Grant that was responsible for the authorization decision, if applicable.",
                "anyOf": [
                    {"$ref": "#/$defs/grant"},
                    {"type": "null"}
                ]
            },
            "message": {
                "type": "string",
                "description": "Details about why the request was authorized or not."
            },
            "errors": templates::errors_body()
        },
        "$defs": {"grant": grant}
    })
}
