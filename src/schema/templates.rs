//! Fixed schema templates composed by the generator
//!
//! Everything here is independent of the submitted definitions. The
//! generator in the parent module fills in the definition-derived pieces
//! (action enums, identity properties, per-resource-type request branches).

use serde_json::{json, Value};

/// Token schema for identity and resource type names.
pub(crate) fn type_token() -> Value {
    json!({
        "title": "Authzee Type",
        "description": "A unique name to identify this type.",
        "type": "string",
        "pattern": "^[A-Za-z0-9_]+$",
        "minLength": 1,
        "maxLength": 256
    })
}

/// Token schema for resource action names.
pub(crate) fn action_token() -> Value {
    json!({
        "title": "Resource Action",
        "description": "Unique name for a resource action. The 'ResourceType:ResourceAction' pattern is common.",
        "type": "string",
        "pattern": "^[A-Za-z0-9_.:-]+$",
        "minLength": 1,
        "maxLength": 512
    })
}

/// Shape of an embedded JSON Schema document.
pub(crate) fn schema_document() -> Value {
    json!({
        "type": ["object", "boolean"]
    })
}

/// Body of the workflow errors schema, without its `$defs` wrapper.
///
/// Context and JMESPath entries reference `#/$defs/grant`, which the
/// enclosing schema (errors or response) is expected to provide.
pub(crate) fn errors_body() -> Value {
    json!({
        "title": "Workflow Errors",
        "description": "Errors returned from authorization workflows.",
        "type": "object",
        "additionalProperties": false,
        "required": ["context", "definition", "grant", "jmespath", "request"],
        "properties": {
            "context": {
                "type": "array",
                "items": {
                    "title": "Context Error",
                    "description": "Error when the request context is not valid against the expected context for the grant.",
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["message", "critical", "grant"],
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Detailed message about what caused the error."
                        },
                        "critical": {
                            "type": "boolean",
                            "description": "If this error caused the workflow to exit early."
                        },
                        "grant": {
                            "$ref": "#/$defs/grant"
                        }
                    }
                }
            },
            "definition": {
                "type": "array",
                "items": {
                    "title": "Definition Error",
                    "description": "Error when an identity or resource definition is not valid.",
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["message", "critical", "definition_type", "definition"],
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Detailed message about what caused the error."
                        },
                        "critical": {
                            "type": "boolean",
                            "description": "If this error caused the workflow to exit early."
                        },
                        "definition_type": {
                            "type": "string",
                            "enum": ["identity", "resource"]
                        },
                        "definition": {
                            "description": "The raw definition as submitted."
                        }
                    }
                }
            },
            "grant": {
                "type": "array",
                "items": {
                    "title": "Grant Error",
                    "description": "Error when a grant is not valid.",
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["message", "critical", "grant"],
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Detailed message about what caused the error."
                        },
                        "critical": {
                            "type": "boolean",
                            "description": "If this error caused the workflow to exit early."
                        },
                        "grant": {
                            "description": "The raw grant as submitted."
                        }
                    }
                }
            },
            "jmespath": {
                "type": "array",
                "items": {
                    "title": "JMESPath Error",
                    "description": "Error when a JMESPath query for a grant produces an error.",
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["message", "critical", "grant"],
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Detailed message about what caused the error."
                        },
                        "critical": {
                            "type": "boolean",
                            "description": "If this error caused the workflow to exit early."
                        },
                        "grant": {
                            "$ref": "#/$defs/grant"
                        }
                    }
                }
            },
            "request": {
                "type": "array",
                "items": {
                    "title": "Workflow Request Error",
                    "description": "Error when a request is not valid.",
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["message", "critical"],
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Detailed message about what caused the error."
                        },
                        "critical": {
                            "type": "boolean",
                            "description": "If this error caused the workflow to exit early."
                        }
                    }
                }
            }
        }
    })
}

/// Shared `$defs/context` entry of the request schema.
pub(crate) fn context_def() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "patternProperties": {
            "^[a-zA-Z0-9_]{1,256}$": {}
        }
    })
}

/// Shared `$defs/query_validation` entry of the request schema.
pub(crate) fn query_validation_def() -> Value {
    json!({
        "type": "string",
        "enum": ["grant", "validate", "error", "critical"]
    })
}

/// Shared `$defs/context_validation` entry of the request schema.
pub(crate) fn context_validation_def() -> Value {
    json!({
        "type": "string",
        "enum": ["grant", "none", "validate", "error", "critical"]
    })
}
