//! Application state and service initialization
//!
//! Centralizes generator selection (LLM or offline stub) and rules
//! configuration checks so the binary only deals with input and output.

use std::sync::Arc;

use crate::model::{Config, RulesConfig};
use crate::service::{LlmClient, StubGenerator, TextGenerator, TriageService};

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Application state containing the triage service
pub struct AppState {
    /// Ticket triage pipeline
    pub triage_service: TriageService,
    /// Whether the deterministic offline generator is in use
    pub offline: bool,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Rules configuration checks
    /// 2. Generator selection: offline stub when requested or when
    ///    OPENAI_API_KEY is unset, the OpenAI client otherwise
    pub fn new(config: Config) -> Result<Self, AppError> {
        validate_rules_config(&config.rules)?;

        let api_key = std::env::var(ENV_OPENAI_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());

        let (generator, offline): (Arc<dyn TextGenerator>, bool) = match api_key {
            Some(key) if !config.offline => {
                let client = LlmClient::new(&key, &config.llm)
                    .map_err(|e| AppError::LlmClient(e.to_string()))?;
                (Arc::new(client), false)
            }
            Some(_) => {
                tracing::info!("Offline mode requested, using deterministic generator");
                (Arc::new(StubGenerator::heuristic()), true)
            }
            None => {
                if !config.offline {
                    tracing::warn!(
                        "{} not set, falling back to the deterministic offline generator",
                        ENV_OPENAI_API_KEY
                    );
                }
                (Arc::new(StubGenerator::heuristic()), true)
            }
        };

        let triage_service = TriageService::new(generator, Arc::new(config.rules));

        Ok(Self {
            triage_service,
            offline,
        })
    }
}

/// Reject rules configurations that could produce out-of-range payloads
/// or an ambiguous audit trail
pub fn validate_rules_config(rules: &RulesConfig) -> Result<(), AppError> {
    let unit_range = 0.0..=1.0;

    for (name, value) in [
        ("baseline_confidence", rules.baseline_confidence),
        ("fallback_confidence", rules.fallback_confidence),
        ("review_threshold", rules.review_threshold),
    ] {
        if !unit_range.contains(&value) {
            return Err(AppError::InvalidConfig(format!(
                "{} must be within [0, 1], got {}",
                name, value
            )));
        }
    }

    if !rules.override_penalty.is_finite() {
        return Err(AppError::InvalidConfig(
            "override_penalty must be a finite number".to_string(),
        ));
    }

    for rule in &rules.rules {
        if rule.name.trim().is_empty() {
            return Err(AppError::InvalidConfig("rule with empty name".to_string()));
        }
        let effect = &rule.effect;
        let finite = effect.confidence_factor.is_none_or(f64::is_finite)
            && effect.confidence_delta.is_none_or(f64::is_finite);
        if !finite {
            return Err(AppError::InvalidConfig(format!(
                "rule '{}' has a non-finite confidence adjustment",
                rule.name
            )));
        }
    }

    if rules.assignees.default_assignee.trim().is_empty() {
        return Err(AppError::InvalidConfig(
            "assignees.default_assignee must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// LLM client could not be created
    #[error("LLM client initialization failed: {0}")]
    LlmClient(String),
}
