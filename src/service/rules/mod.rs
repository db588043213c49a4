//! Deterministic rules pass
//!
//! Consumes the extraction outcome, applies the ordered rule list, scores
//! confidence and assembles the final payload. Nothing in here can fail.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::model::{
    Category, ClassificationRecord, FinalPayload, Priority, Rule, RuleMatcher, RulesConfig,
};
use crate::service::extraction::ExtractionError;
use crate::service::rules::explanation::{DecisionSource, build_explanation};

pub mod confidence;
pub mod explanation;

/// Audit marker appended when the fallback record was used
pub const FALLBACK_MARKER: &str = "extraction_failure_fallback";
/// Audit marker appended when the override penalty was subtracted
pub const OVERRIDE_PENALTY_MARKER: &str = "override_penalty";
/// Audit marker appended when the final confidence fell under the review threshold
pub const LOW_CONFIDENCE_MARKER: &str = "confidence_below_threshold";
/// Audit marker appended when a rule override sent the ticket to review
pub const OVERRIDE_REVIEW_MARKER: &str = "override_review";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Lowercase, collapse whitespace runs, trim
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

/// Working state while rules are evaluated for one ticket
struct Evaluation<'a> {
    category: Category,
    category_source: DecisionSource<'a>,
    priority: Priority,
    priority_source: DecisionSource<'a>,
    confidence: f64,
    /// Fired rules whose effect asks for review
    review_rules: Vec<&'a str>,
    fired: Vec<&'a str>,
    category_signals: HashSet<Category>,
}

/// Applies the configured rules to extraction results
#[derive(Clone)]
pub struct RulesEngine {
    config: Arc<RulesConfig>,
}

impl RulesEngine {
    pub fn new(config: Arc<RulesConfig>) -> Self {
        Self { config }
    }

    /// Build the final payload for one ticket.
    ///
    /// On extraction failure the fallback record is substituted, the error is
    /// stamped into the payload and review is forced. Every adjustment made
    /// after the rule list (override penalty, review triggers) leaves a marker
    /// in `rules_applied`.
    pub fn apply_rules(
        &self,
        ticket_text: &str,
        extraction: Result<&ClassificationRecord, &ExtractionError>,
    ) -> FinalPayload {
        let fallback;
        let (record, error, base_source, baseline) = match extraction {
            Ok(record) => (
                record,
                None,
                DecisionSource::Model,
                self.config.baseline_confidence,
            ),
            Err(e) => {
                fallback = ClassificationRecord::fallback();
                (
                    &fallback,
                    Some(e.to_string()),
                    DecisionSource::Fallback,
                    self.config.fallback_confidence,
                )
            }
        };

        let normalized = normalize_text(ticket_text);

        let mut eval = Evaluation {
            category: record.category(),
            category_source: base_source,
            priority: record.priority(),
            priority_source: base_source,
            confidence: baseline,
            review_rules: Vec::new(),
            fired: Vec::new(),
            category_signals: HashSet::new(),
        };

        for rule in &self.config.rules {
            if matches_rule(rule, &normalized, &eval) {
                fire(rule, &mut eval);
            }
        }

        let mut rules_applied: Vec<String> = eval.fired.iter().map(|n| n.to_string()).collect();

        let overridden =
            eval.category != record.category() || eval.priority != record.priority();
        if overridden && self.config.override_penalty != 0.0 {
            eval.confidence -= self.config.override_penalty;
            rules_applied.push(OVERRIDE_PENALTY_MARKER.to_string());
        }

        let confidence = confidence::finalize(eval.confidence);
        let extraction_failed = error.is_some();

        let mut review_reasons: Vec<&str> = Vec::new();
        if extraction_failed {
            rules_applied.push(FALLBACK_MARKER.to_string());
            review_reasons.push(FALLBACK_MARKER);
        }
        review_reasons.extend(eval.review_rules.iter().copied());
        if confidence::below_threshold(confidence, self.config.review_threshold) {
            rules_applied.push(LOW_CONFIDENCE_MARKER.to_string());
            review_reasons.push(LOW_CONFIDENCE_MARKER);
        }
        if overridden && self.config.review_on_override {
            rules_applied.push(OVERRIDE_REVIEW_MARKER.to_string());
            review_reasons.push(OVERRIDE_REVIEW_MARKER);
        }
        let needs_human_review = !review_reasons.is_empty();

        let suggested_assignee = self
            .config
            .assignees
            .lookup(eval.category, eval.priority)
            .to_string();

        let explanation = build_explanation(
            error.as_deref(),
            (eval.category, eval.category_source),
            (eval.priority, eval.priority_source),
            &suggested_assignee,
            &review_reasons,
        );

        tracing::debug!(
            category = %eval.category,
            priority = %eval.priority,
            confidence = confidence,
            needs_human_review = needs_human_review,
            overridden = overridden,
            rules_fired = eval.fired.len(),
            extraction_failed = extraction_failed,
            "Rules applied"
        );

        FinalPayload {
            summary: record.summary().to_vec(),
            category: eval.category,
            priority: eval.priority,
            suggested_assignee,
            confidence,
            needs_human_review,
            rules_applied,
            explanation,
            error,
        }
    }
}

fn matches_rule(rule: &Rule, normalized: &str, eval: &Evaluation<'_>) -> bool {
    match &rule.when {
        RuleMatcher::KeywordsAny { keywords } => keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && normalized.contains(&k)),
        RuleMatcher::ShortText { max_chars } => {
            let len = normalized.chars().count();
            len > 0 && len < *max_chars
        }
        RuleMatcher::ConflictingCategories => eval.category_signals.len() >= 2,
    }
}

/// Apply one rule's effect. A rule becomes the source of a field only when it
/// actually changes that field's value.
fn fire<'a>(rule: &'a Rule, eval: &mut Evaluation<'a>) {
    let effect = &rule.effect;
    let source = DecisionSource::Rule(&rule.name);

    if let Some(category) = effect.category {
        eval.category_signals.insert(category);
        if category != eval.category {
            eval.category = category;
            eval.category_source = source;
        }
    }

    let mut priority = effect.priority.unwrap_or(eval.priority);
    if effect.escalate_priority {
        priority = priority.escalate();
    }
    if priority != eval.priority {
        eval.priority = priority;
        eval.priority_source = source;
    }

    eval.confidence = confidence::adjust(eval.confidence, effect);
    if effect.review {
        eval.review_rules.push(&rule.name);
    }
    eval.fired.push(&rule.name);
}
