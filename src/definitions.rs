//! Identity and resource definition validation
//!
//! Definitions are checked against built-in meta-schemas, then for type-name
//! uniqueness, and finally for referential integrity of the resource
//! hierarchy. Every definition error is critical: a workflow that sees one
//! stops before schema generation is put to use.

use std::collections::HashSet;

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::report::DefinitionError;
use crate::schema::cache;
use crate::schema::templates;
use crate::types::{DefinitionType, IdentityDefinition, ResourceDefinition};

/// Meta-schema every identity definition must satisfy.
pub fn identity_definition_schema() -> Value {
    json!({
        "title": "Identity Definition",
        "description": "An identity definition. Defines a type of identity to use with authorization workflows.",
        "type": "object",
        "additionalProperties": false,
        "required": ["identity_type", "schema"],
        "properties": {
            "identity_type": templates::type_token(),
            "schema": templates::schema_document()
        }
    })
}

/// Meta-schema every resource definition must satisfy.
pub fn resource_definition_schema() -> Value {
    json!({
        "title": "Resource Definition",
        "description": "A resource definition. Defines a type of resource to use with authorization workflows.",
        "type": "object",
        "additionalProperties": false,
        "required": ["resource_type", "actions", "schema", "parent_types", "child_types"],
        "properties": {
            "resource_type": templates::type_token(),
            "actions": {
                "type": "array",
                "minItems": 1,
                "uniqueItems": true,
                "items": templates::action_token()
            },
            "schema": templates::schema_document(),
            "parent_types": {
                "type": "array",
                "uniqueItems": true,
                "items": {"type": "string"},
                "description": "Types that are a parent of this resource. When instances of these types are passed to the request they will be checked against their schemas and against the hierarchy."
            },
            "child_types": {
                "type": "array",
                "uniqueItems": true,
                "items": {"type": "string"},
                "description": "Types that are a child of this resource. When instances of these types are passed to the request they will be checked against their schemas and against the hierarchy."
            }
        }
    })
}

static IDENTITY_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    cache::compile(&identity_definition_schema()).expect("identity definition meta-schema compiles")
});

static RESOURCE_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    cache::compile(&resource_definition_schema()).expect("resource definition meta-schema compiles")
});

/// Validate the full definition set.
///
/// Returns every violation found; an empty list means the definitions are
/// usable for schema generation. All entries are `critical`.
pub fn validate_definitions(
    identity_defs: &[IdentityDefinition],
    resource_defs: &[ResourceDefinition],
) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    let mut identity_types: HashSet<&str> = HashSet::new();
    for def in identity_defs {
        let raw = serde_json::to_value(def).unwrap_or_default();

        if let Some(detail) = cache::violation_detail(&IDENTITY_VALIDATOR, &raw) {
            errors.push(identity_error(
                format!("Identity definition is not valid. Schema error: {detail}"),
                raw,
            ));
            continue;
        }

        if let Err(err) = cache::compile(&def.schema) {
            errors.push(identity_error(
                format!(
                    "Identity definition '{}' does not carry a valid JSON Schema: {}",
                    def.identity_type,
                    err.message()
                ),
                raw.clone(),
            ));
        }

        if !identity_types.insert(def.identity_type.as_str()) {
            errors.push(identity_error(
                format!(
                    "Identity types must be unique. '{}' is present more than once.",
                    def.identity_type
                ),
                raw,
            ));
        }
    }

    let mut resource_types: HashSet<&str> = HashSet::new();
    for def in resource_defs {
        let raw = serde_json::to_value(def).unwrap_or_default();

        if let Some(detail) = cache::violation_detail(&RESOURCE_VALIDATOR, &raw) {
            errors.push(resource_error(
                format!("Resource definition is not valid. Schema error: {detail}"),
                raw,
            ));
            continue;
        }

        if let Err(err) = cache::compile(&def.schema) {
            errors.push(resource_error(
                format!(
                    "Resource definition '{}' does not carry a valid JSON Schema: {}",
                    def.resource_type,
                    err.message()
                ),
                raw.clone(),
            ));
        }

        if !resource_types.insert(def.resource_type.as_str()) {
            errors.push(resource_error(
                format!(
                    "Resource types must be unique. '{}' is present more than once.",
                    def.resource_type
                ),
                raw,
            ));
        }
    }

    // Hierarchy references may only name resource types defined in this set.
    for def in resource_defs {
        let raw = serde_json::to_value(def).unwrap_or_default();

        for parent in &def.parent_types {
            if !resource_types.contains(parent.as_str()) {
                errors.push(resource_error(
                    format!(
                        "Parent type '{parent}' does not have a corresponding resource definition."
                    ),
                    raw.clone(),
                ));
            }
        }

        for child in &def.child_types {
            if !resource_types.contains(child.as_str()) {
                errors.push(resource_error(
                    format!(
                        "Child type '{child}' does not have a corresponding resource definition."
                    ),
                    raw.clone(),
                ));
            }
        }
    }

    errors
}

fn identity_error(message: String, definition: Value) -> DefinitionError {
    DefinitionError {
        message,
        critical: true,
        definition_type: DefinitionType::Identity,
        definition,
    }
}

fn resource_error(message: String, definition: Value) -> DefinitionError {
    DefinitionError {
        message,
        critical: true,
        definition_type: DefinitionType::Resource,
        definition,
    }
}
