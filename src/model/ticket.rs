use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket category as exposed in the final payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Bug,
    Feature,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Billing,
        Category::Bug,
        Category::Feature,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Bug => "Bug",
            Category::Feature => "Feature",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Ticket priority, ordered Low < Medium < High
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Raise by one level, saturating at High
    pub fn escalate(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium | Priority::High => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown priority '{}'", s))
    }
}

const FALLBACK_SUMMARY: [&str; 3] = [
    "Unable to confidently summarize ticket.",
    "Requires human review.",
    "Please review the original message.",
];

/// Validated classification of a single ticket.
///
/// Fields are only reachable through accessors; a record is either built by
/// the extraction validator (all fields checked) or is the fixed fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    summary: Vec<String>,
    category: Category,
    priority: Priority,
}

impl ClassificationRecord {
    /// Only the extraction validator calls this, after every field has been checked
    pub(crate) fn new(summary: Vec<String>, category: Category, priority: Priority) -> Self {
        Self {
            summary,
            category,
            priority,
        }
    }

    /// Record substituted when extraction produced nothing usable
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.iter().map(|s| s.to_string()).collect(),
            category: Category::General,
            priority: Priority::Medium,
        }
    }

    pub fn summary(&self) -> &[String] {
        &self.summary
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}
