//! # Authzee
//!
//! Grant-based authorization engine.
//!
//! Authorization is decided from four inputs: identity definitions, resource
//! definitions (actions plus parent/child hierarchy), an ordered list of
//! allow/deny *grants* carrying JMESPath queries, and a *request* naming
//! identities, a resource, an action, related resources, and context data.
//! The engine validates everything against schemas it generates from the
//! definitions, then either collects every applicable grant (audit) or
//! returns a single allow/deny decision (authorize).
//!
//! ## Features
//!
//! - **Schema generation** - grant, request, error, and response schemas are
//!   derived from the definitions and validate every input at runtime
//! - **Deny-wins decisions** - any applicable deny grant refuses the request;
//!   no applicable grant at all is an implicit deny
//! - **Pluggable queries** - JMESPath evaluation is a host-supplied callback,
//!   so custom functions stay host-side
//! - **Errors as data** - validation and query failures are collected into
//!   the response, with configurable severity per grant or per request
//! - **No I/O** - workflow calls are pure and synchronous; one engine can be
//!   shared across threads
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use authzee::{
//!     ContextValidation, ContextValidationOverride, Effect, Engine, Grant,
//!     IdentityDefinition, QueryValidation, QueryValidationOverride, Request,
//!     ResourceDefinition, SearchError,
//! };
//! use serde_json::{json, Value};
//!
//! // The host supplies the JMESPath implementation. A stub is enough here.
//! fn search(_expression: &str, data: &Value) -> Result<Value, SearchError> {
//!     Ok(json!(data["request"]["identities"]["User"][0]["role"] == json!("admin")))
//! }
//!
//! let engine = Engine::new(
//!     vec![IdentityDefinition {
//!         identity_type: "User".to_string(),
//!         schema: json!({"type": "object"}),
//!     }],
//!     vec![ResourceDefinition {
//!         resource_type: "Balloon".to_string(),
//!         actions: vec!["pop".to_string(), "inflate".to_string()],
//!         schema: json!({"type": "object"}),
//!         parent_types: Vec::new(),
//!         child_types: Vec::new(),
//!     }],
//! );
//!
//! let grants = vec![Grant {
//!     effect: Effect::Allow,
//!     actions: vec!["pop".to_string()],
//!     query: "request.identities.User[0].role == 'admin'".to_string(),
//!     query_validation: QueryValidation::Error,
//!     equality: json!(true),
//!     data: json!({}),
//!     context_schema: json!({"type": "object"}),
//!     context_validation: ContextValidation::None,
//! }];
//!
//! let mut identities = BTreeMap::new();
//! identities.insert("User".to_string(), vec![json!({"role": "admin"})]);
//! let request = Request {
//!     identities,
//!     resource_type: "Balloon".to_string(),
//!     action: "pop".to_string(),
//!     resource: json!({"id": "b-1"}),
//!     parents: BTreeMap::new(),
//!     children: BTreeMap::new(),
//!     query_validation: QueryValidationOverride::Grant,
//!     context: BTreeMap::new(),
//!     context_validation: ContextValidationOverride::Grant,
//! };
//!
//! let response = engine.authorize(&grants, &request, &search);
//! assert!(response.authorized);
//! assert!(response.completed);
//! ```

pub mod compare;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod report;
pub mod schema;
pub mod search;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use definitions::{
    identity_definition_schema, resource_definition_schema, validate_definitions,
};
pub use engine::{AuditResponse, AuthorizeResponse, Engine, EngineConfig};
pub use error::SchemaCompileError;
pub use report::{
    ContextError, DefinitionError, ErrorBundle, GrantError, JmesPathError, RequestError,
};
pub use schema::{generate_schemas, CacheStats, SchemaSet, ValidatorCache};
pub use search::{Search, SearchError};
pub use types::{
    ContextValidation, ContextValidationOverride, DefinitionType, Effect, Grant,
    IdentityDefinition, QueryValidation, QueryValidationOverride, Request, ResourceDefinition,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
