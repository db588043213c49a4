//! Deterministic offline generator
//!
//! Stands in for the LLM when running without credentials and in tests. It
//! can answer with fixed text (well-formed or not), simulate a provider
//! failure, or produce a plausible classification from the prompt.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::service::extraction::prompts::{TICKET_END_MARKER, TICKET_START_MARKER};
use crate::service::llm::{ProviderError, TextGenerator};

#[derive(Debug, Clone)]
enum StubMode {
    Respond(String),
    Fail(String),
    Heuristic,
}

/// Offline [`TextGenerator`] with deterministic output
#[derive(Debug)]
pub struct StubGenerator {
    mode: StubMode,
    calls: AtomicUsize,
}

impl StubGenerator {
    /// Always answer with `response`, verbatim
    pub fn responding(response: impl Into<String>) -> Self {
        Self::with_mode(StubMode::Respond(response.into()))
    }

    /// Always fail as if the provider was unreachable
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode(StubMode::Fail(message.into()))
    }

    /// Derive a well-formed classification from the ticket embedded in the prompt
    pub fn heuristic() -> Self {
        Self::with_mode(StubMode::Heuristic)
    }

    fn with_mode(mode: StubMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            StubMode::Respond(response) => Ok(response.clone()),
            StubMode::Fail(message) => Err(ProviderError::Request(message.clone())),
            StubMode::Heuristic => Ok(heuristic_response(prompt)),
        }
    }

    fn name(&self) -> &str {
        "offline-stub"
    }
}

fn heuristic_response(prompt: &str) -> String {
    let ticket = embedded_ticket(prompt);
    let lower = ticket.to_lowercase();

    let category = if ["refund", "invoice", "charged", "payment", "billing"]
        .iter()
        .any(|k| lower.contains(k))
    {
        "Billing"
    } else if ["error", "crash", "broken", "bug", "down"]
        .iter()
        .any(|k| lower.contains(k))
    {
        "Bug"
    } else if ["feature", "would like", "can you add"]
        .iter()
        .any(|k| lower.contains(k))
    {
        "Feature"
    } else {
        "General"
    };

    let priority = if ["urgent", "asap", "outage", "down"]
        .iter()
        .any(|k| lower.contains(k))
    {
        "High"
    } else {
        "Medium"
    };

    let mut summary: Vec<String> = ticket
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(5)
        .map(str::to_string)
        .collect();

    while summary.len() < 3 {
        summary.push(format!("Ticket classified as {} offline.", category));
    }

    json!({
        "summary": summary,
        "priority": priority,
        "category": category,
    })
    .to_string()
}

/// Ticket text between the prompt markers, or the whole prompt if absent
fn embedded_ticket(prompt: &str) -> &str {
    prompt
        .split_once(TICKET_START_MARKER)
        .and_then(|(_, rest)| rest.split_once(TICKET_END_MARKER))
        .map(|(ticket, _)| ticket.trim())
        .unwrap_or(prompt)
}
