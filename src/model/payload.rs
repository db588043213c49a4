use serde::{Deserialize, Serialize};

use crate::model::{Category, Priority};

/// Externally visible triage result.
///
/// Flat record: the only nested value is the `summary` list. `error` is
/// serialized as `null` when extraction succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPayload {
    pub summary: Vec<String>,
    pub category: Category,
    pub priority: Priority,
    pub suggested_assignee: String,
    /// Always within [0.0, 1.0], rounded to two decimals
    pub confidence: f64,
    pub needs_human_review: bool,
    /// Names of fired rules, in evaluation order
    pub rules_applied: Vec<String>,
    pub explanation: String,
    pub error: Option<String>,
}
