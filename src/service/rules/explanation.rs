//! Human-readable decision path

use std::fmt;

use crate::model::{Category, Priority};

/// Which signal determined a final field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource<'a> {
    Model,
    Fallback,
    Rule(&'a str),
}

impl fmt::Display for DecisionSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionSource::Model => f.write_str("model"),
            DecisionSource::Fallback => f.write_str("fallback"),
            DecisionSource::Rule(name) => write!(f, "rule {}", name),
        }
    }
}

/// Deterministic `" | "`-joined explanation. The review segment is only
/// present when `review_reasons` is non-empty.
pub fn build_explanation(
    error: Option<&str>,
    category: (Category, DecisionSource<'_>),
    priority: (Priority, DecisionSource<'_>),
    assignee: &str,
    review_reasons: &[&str],
) -> String {
    let mut parts = Vec::with_capacity(5);

    if let Some(error) = error {
        parts.push(format!("extraction failed: {}", error));
    }
    parts.push(format!("category {} from {}", category.0, category.1));
    parts.push(format!("priority {} from {}", priority.0, priority.1));
    parts.push(format!("assignee {}", assignee));
    if !review_reasons.is_empty() {
        parts.push(format!("review required by {}", review_reasons.join(", ")));
    }

    parts.join(" | ")
}
