//! Rule definitions and the rules-stage configuration
//!
//! Everything here is plain data: it is loaded once at startup (defaults or
//! the `rules` section of the YAML config) and handed to the rules engine by
//! reference.

use serde::{Deserialize, Serialize};

use crate::model::{Category, Priority};

/// A named deterministic predicate paired with an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub when: RuleMatcher,
    #[serde(default)]
    pub effect: RuleEffect,
}

/// Predicate evaluated against the normalized ticket text and the rules that
/// already fired during the current evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleMatcher {
    /// Any keyword occurs as a substring of the normalized text
    KeywordsAny { keywords: Vec<String> },
    /// Normalized text is non-empty and shorter than `max_chars` characters
    ShortText { max_chars: usize },
    /// Two or more already-fired rules set different categories
    ConflictingCategories,
}

/// What a fired rule changes.
///
/// Within one rule the priority is set before it is escalated, and the
/// confidence is scaled before the delta is added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEffect {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub escalate_priority: bool,
    pub confidence_factor: Option<f64>,
    pub confidence_delta: Option<f64>,
    pub review: bool,
}

/// Assignee for a category, optionally narrowed to one priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssigneeRoute {
    pub category: Category,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub assignee: String,
}

/// Static (category, priority) → team table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssigneeTable {
    pub routes: Vec<AssigneeRoute>,
    pub default_assignee: String,
}

impl AssigneeTable {
    /// Exact (category, priority) route first, then a category-wide route,
    /// then the default team
    pub fn lookup(&self, category: Category, priority: Priority) -> &str {
        self.routes
            .iter()
            .find(|r| r.category == category && r.priority == Some(priority))
            .or_else(|| {
                self.routes
                    .iter()
                    .find(|r| r.category == category && r.priority.is_none())
            })
            .map(|r| r.assignee.as_str())
            .unwrap_or(&self.default_assignee)
    }
}

impl Default for AssigneeTable {
    fn default() -> Self {
        let route = |category, priority, assignee: &str| AssigneeRoute {
            category,
            priority,
            assignee: assignee.to_string(),
        };

        Self {
            routes: vec![
                route(Category::Bug, Some(Priority::High), "Engineering - On-call"),
                route(Category::Bug, None, "Engineering - Bugs"),
                route(Category::Billing, None, "Billing Team"),
                route(Category::Feature, None, "Product - Feature Requests"),
                route(Category::General, None, "Support L1"),
            ],
            default_assignee: "Support L1".to_string(),
        }
    }
}

/// Configuration of the rules stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Starting confidence when the model output validated
    pub baseline_confidence: f64,
    /// Starting confidence when the fallback record is used
    pub fallback_confidence: f64,
    /// Review is required when confidence is strictly below this value
    pub review_threshold: f64,
    /// Subtracted once when rules changed the record's category or priority
    pub override_penalty: f64,
    /// Send the ticket to a human whenever rules changed the category or priority
    pub review_on_override: bool,
    /// Evaluated in order; later overrides win
    pub rules: Vec<Rule>,
    pub assignees: AssigneeTable,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            baseline_confidence: 0.7,
            fallback_confidence: 0.2,
            review_threshold: 0.5,
            override_penalty: 0.1,
            review_on_override: true,
            rules: default_rules(),
            assignees: AssigneeTable::default(),
        }
    }
}

fn keywords(words: &[&str]) -> RuleMatcher {
    RuleMatcher::KeywordsAny {
        keywords: words.iter().map(|w| w.to_string()).collect(),
    }
}

/// Built-in rule list used when the config file has no `rules.rules` entry
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "feature_request_keywords".to_string(),
            when: keywords(&[
                "feature request",
                "would like",
                "can you add",
                "enhancement",
                "request a feature",
                "add support for",
            ]),
            effect: RuleEffect {
                category: Some(Category::Feature),
                ..Default::default()
            },
        },
        Rule {
            name: "bug_keywords".to_string(),
            when: keywords(&[
                "error",
                "500",
                "crash",
                "broken",
                "bug",
                "stack trace",
                "exception",
                "internal server error",
            ]),
            effect: RuleEffect {
                category: Some(Category::Bug),
                ..Default::default()
            },
        },
        Rule {
            name: "billing_keywords".to_string(),
            when: keywords(&[
                "refund",
                "invoice",
                "charged",
                "charge",
                "payment",
                "billing",
                "credit card",
                "subscription",
            ]),
            effect: RuleEffect {
                category: Some(Category::Billing),
                ..Default::default()
            },
        },
        Rule {
            name: "outage_keywords".to_string(),
            when: keywords(&[
                "system is down",
                "site is down",
                "is down for",
                "outage",
                "downtime",
                "production down",
                "prod down",
                "data loss",
                "security breach",
                "can't access",
                "cannot access",
                "can't login",
                "cannot login",
                "sev0",
                "sev1",
            ]),
            effect: RuleEffect {
                category: Some(Category::Bug),
                priority: Some(Priority::High),
                confidence_delta: Some(0.1),
                ..Default::default()
            },
        },
        Rule {
            name: "urgency_language".to_string(),
            when: keywords(&["urgent", "immediately", "asap", "right away", "emergency", "p0"]),
            effect: RuleEffect {
                escalate_priority: true,
                confidence_factor: Some(0.8),
                ..Default::default()
            },
        },
        Rule {
            name: "ambiguous_category".to_string(),
            when: RuleMatcher::ConflictingCategories,
            effect: RuleEffect {
                confidence_delta: Some(-0.15),
                review: true,
                ..Default::default()
            },
        },
        Rule {
            name: "short_ticket".to_string(),
            when: RuleMatcher::ShortText { max_chars: 30 },
            effect: RuleEffect {
                confidence_delta: Some(-0.2),
                ..Default::default()
            },
        },
    ]
}
