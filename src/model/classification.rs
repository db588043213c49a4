//! Output shape requested from the model
//!
//! Only used to render the JSON schema embedded in the extraction prompt.
//! Responses are never deserialized into this type directly; they go through
//! the fail-closed validator instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LLM-facing ticket classification structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Classification of a customer support ticket")]
pub struct ExtractedClassification {
    #[schemars(description = "3 to 5 concise, factual bullet strings summarizing the ticket")]
    pub summary: Vec<String>,

    #[schemars(description = "One of: \"Low\", \"Medium\", \"High\"")]
    pub priority: String,

    #[schemars(description = "One of: \"Billing\", \"Bug\", \"Feature\", \"General\"")]
    pub category: String,
}
