//! Error types for ticket extraction

use thiserror::Error;

/// Why a ticket could not be turned into a classification record.
///
/// The display string is what ends up in the payload's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("empty_ticket_text")]
    EmptyTicket,

    #[error("llm_call_failed: {0}")]
    ProviderFailure(String),

    #[error("invalid_json: {0}")]
    MalformedOutput(String),

    #[error("invalid_fields: {}", .0.join(", "))]
    ValidationFailed(Vec<&'static str>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_lists_fields() {
        let err = ExtractionError::ValidationFailed(vec!["summary", "priority"]);
        assert_eq!(err.to_string(), "invalid_fields: summary, priority");
    }
}
