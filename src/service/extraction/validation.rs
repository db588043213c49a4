//! Validation logic for LLM-produced classifications
//!
//! The raw response is parsed into an untyped JSON value and then checked
//! field by field. Validation fails closed: any hard error means no record.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{Category, ClassificationRecord, Priority};
use crate::service::extraction::ExtractionError;

/// Upper bound on summary bullets
pub const MAX_SUMMARY_ITEMS: usize = 5;
/// Expected lower bound; shorter summaries only produce a warning
pub const MIN_SUMMARY_ITEMS: usize = 3;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

/// Result of classification validation
#[derive(Debug, Default)]
pub struct ClassificationValidationResult {
    /// Fields that failed hard validation, in check order
    pub invalid_fields: Vec<&'static str>,
    /// Soft issues that do not reject the output
    pub warnings: Vec<String>,
}

impl ClassificationValidationResult {
    pub fn is_valid(&self) -> bool {
        self.invalid_fields.is_empty()
    }

    /// Add a failing field to the validation result
    pub fn add_error(&mut self, field: &'static str) {
        self.invalid_fields.push(field);
    }

    /// Add a warning to the validation result
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Parse a raw model response into a JSON object.
///
/// A single surrounding markdown code fence is tolerated.
pub fn parse_response(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExtractionError::MalformedOutput(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ExtractionError::MalformedOutput(e.to_string())),
    }
}

/// Validate a parsed response into a classification record
pub fn validate_classification(
    object: &Map<String, Value>,
) -> Result<ClassificationRecord, ExtractionError> {
    let mut result = ClassificationValidationResult::default();

    let summary = validate_summary(object.get("summary"), &mut result);
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Category>().ok());
    if category.is_none() {
        result.add_error("category");
    }
    let priority = object
        .get("priority")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Priority>().ok());
    if priority.is_none() {
        result.add_error("priority");
    }

    for warning in &result.warnings {
        tracing::warn!(warning = %warning, "Classification accepted with soft issue");
    }

    match (summary, category, priority) {
        (Some(summary), Some(category), Some(priority)) if result.is_valid() => {
            Ok(ClassificationRecord::new(summary, category, priority))
        }
        _ => Err(ExtractionError::ValidationFailed(result.invalid_fields)),
    }
}

fn validate_summary(
    value: Option<&Value>,
    result: &mut ClassificationValidationResult,
) -> Option<Vec<String>> {
    let Some(items) = value.and_then(Value::as_array) else {
        result.add_error("summary");
        return None;
    };

    if items.is_empty() || items.len() > MAX_SUMMARY_ITEMS {
        result.add_error("summary");
        return None;
    }

    let bullets: Option<Vec<String>> = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();

    let Some(bullets) = bullets else {
        result.add_error("summary");
        return None;
    };

    if bullets.len() < MIN_SUMMARY_ITEMS {
        result.add_warning(format!(
            "Summary has {} bullet(s), expected at least {}",
            bullets.len(),
            MIN_SUMMARY_ITEMS
        ));
    }

    Some(bullets)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn test_valid_classification() {
        let obj = object(json!({
            "summary": ["Payment failed", "Charged twice", "Wants refund"],
            "priority": "High",
            "category": "Billing"
        }));

        let record = validate_classification(&obj).unwrap();
        assert_eq!(record.category(), Category::Billing);
        assert_eq!(record.priority(), Priority::High);
        assert_eq!(record.summary().len(), 3);
    }

    #[test]
    fn test_lowercase_values_are_normalized() {
        let obj = object(json!({
            "summary": ["a", "b", "c"],
            "priority": "low",
            "category": "billing"
        }));

        let record = validate_classification(&obj).unwrap();
        assert_eq!(record.category(), Category::Billing);
        assert_eq!(record.priority(), Priority::Low);
    }

    #[test]
    fn test_short_summary_is_tolerated() {
        let obj = object(json!({
            "summary": ["Only one bullet"],
            "priority": "Medium",
            "category": "General"
        }));

        let record = validate_classification(&obj).unwrap();
        assert_eq!(record.summary(), ["Only one bullet".to_string()]);
    }

    #[test]
    fn test_summary_bounds_and_items() {
        let too_many = object(json!({
            "summary": ["1", "2", "3", "4", "5", "6"],
            "priority": "Medium",
            "category": "General"
        }));
        assert_eq!(
            validate_classification(&too_many),
            Err(ExtractionError::ValidationFailed(vec!["summary"]))
        );

        let empty = object(json!({"summary": [], "priority": "Medium", "category": "Bug"}));
        assert_eq!(
            validate_classification(&empty),
            Err(ExtractionError::ValidationFailed(vec!["summary"]))
        );

        let blank_item = object(json!({
            "summary": ["ok", "   ", "ok"],
            "priority": "Medium",
            "category": "Bug"
        }));
        assert_eq!(
            validate_classification(&blank_item),
            Err(ExtractionError::ValidationFailed(vec!["summary"]))
        );

        let non_string = object(json!({
            "summary": ["ok", 3, "ok"],
            "priority": "Medium",
            "category": "Bug"
        }));
        assert!(validate_classification(&non_string).is_err());
    }

    #[test]
    fn test_all_failing_fields_are_reported() {
        let obj = object(json!({
            "summary": "not a list",
            "priority": "Critical",
        }));

        assert_eq!(
            validate_classification(&obj),
            Err(ExtractionError::ValidationFailed(vec![
                "summary", "category", "priority"
            ]))
        );
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        let err = parse_response("This is not JSON at all. Just plain text.").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedOutput(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_response("[1, 2, 3]").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MalformedOutput("expected a JSON object, got an array".to_string())
        );
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let raw = "```json\n{\"summary\": [\"a\"], \"priority\": \"Low\", \"category\": \"Bug\"}\n```";
        let map = parse_response(raw).unwrap();
        assert_eq!(map["priority"], "Low");
    }
}
