//! Prompts for ticket classification

use std::sync::LazyLock;

use crate::model::classification::ExtractedClassification;

pub const TICKET_START_MARKER: &str = "<ticket>";
pub const TICKET_END_MARKER: &str = "</ticket>";

/// JSON schema of the expected response object, rendered once
static OUTPUT_SCHEMA: LazyLock<String> = LazyLock::new(|| {
    let schema = schemars::schema_for!(ExtractedClassification);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
});

const OUTPUT_EXAMPLE: &str =
    r#"{"summary":["...","...","..."],"priority":"Medium","category":"Bug"}"#;

/// Build the classification prompt for one ticket
pub fn build_extraction_prompt(ticket_text: &str) -> String {
    format!(
        r#"Analyze the support ticket below and output ONLY valid JSON (no markdown, no extra text).

{start}
{ticket}
{end}

Return a JSON object with:
- summary: array of 3 to 5 concise bullet strings
- priority: one of "Low", "Medium", "High"
- category: one of "Billing", "Bug", "Feature", "General"

The object must conform to this JSON schema:
{schema}

Rules:
- Do NOT invent details that are not in the ticket
- Keep it factual and concise
- If unsure of category, use "General"

Example:
{example}"#,
        start = TICKET_START_MARKER,
        ticket = ticket_text.trim(),
        end = TICKET_END_MARKER,
        schema = OUTPUT_SCHEMA.as_str(),
        example = OUTPUT_EXAMPLE,
    )
}
