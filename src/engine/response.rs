//! Workflow response types

use serde::{Deserialize, Serialize};

use crate::report::ErrorBundle;
use crate::types::Grant;

/// Response of the audit workflow: every applicable grant, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResponse {
    /// False when a critical error stopped the workflow early.
    pub completed: bool,

    /// Applicable grants in grant-input order. Not definitive unless
    /// `completed` is true.
    pub grants: Vec<Grant>,

    pub errors: ErrorBundle,
}

/// Response of the authorize workflow: a single allow/deny decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    /// True when an allow grant is applicable and no deny grant is.
    pub authorized: bool,

    /// False when a critical error stopped the workflow early.
    pub completed: bool,

    /// The grant that determined the decision. Absent on implicit deny,
    /// halted workflows, and validation failures.
    pub grant: Option<Grant>,

    /// Details about why the request was or was not authorized.
    pub message: String,

    pub errors: ErrorBundle,
}
