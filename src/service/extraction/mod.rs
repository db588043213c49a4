//! Ticket classification extraction using an LLM
//!
//! One generation attempt per ticket, parsed and validated into a
//! [`ClassificationRecord`] or a typed [`ExtractionError`]. Retries are the
//! caller's concern.

use std::sync::Arc;

use crate::model::ClassificationRecord;
use crate::service::extraction::prompts::build_extraction_prompt;
use crate::service::extraction::validation::{parse_response, validate_classification};
use crate::service::llm::TextGenerator;

pub mod error;
pub mod prompts;
pub mod validation;

pub use error::ExtractionError;

/// Turns ticket text into a validated classification
pub struct Extractor {
    generator: Arc<dyn TextGenerator>,
}

impl Extractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify a single ticket
    pub async fn extract(&self, ticket_text: &str) -> Result<ClassificationRecord, ExtractionError> {
        if ticket_text.trim().is_empty() {
            tracing::debug!("Empty ticket text, skipping generation");
            return Err(ExtractionError::EmptyTicket);
        }

        let prompt = build_extraction_prompt(ticket_text);

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            tracing::warn!(
                generator = %self.generator.name(),
                error = %e,
                "Text generation failed"
            );
            ExtractionError::ProviderFailure(e.to_string())
        })?;

        let object = parse_response(&raw).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                response_length = raw.len(),
                "Model response is not a JSON object"
            );
        })?;

        let record = validate_classification(&object).inspect_err(|e| {
            tracing::warn!(error = %e, "Model response failed validation");
        })?;

        tracing::debug!(
            category = %record.category(),
            priority = %record.priority(),
            summary_items = record.summary().len(),
            "Extracted ticket classification"
        );

        Ok(record)
    }
}
