//! Text generation capability and the OpenAI-backed client
//!
//! The rest of the pipeline only sees [`TextGenerator`]; the concrete client
//! can be swapped for the offline stub.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::model::LlmConfig;

const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Preamble sent with every classification request
const TRIAGE_PREAMBLE: &str =
    "You are a support ticket triage assistant. You respond with a single JSON object and nothing else.";

/// Failure of the external generation call itself
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("client initialization failed: {0}")]
    Client(String),
}

/// Opaque `generate(prompt) -> raw_text` capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Identifier used in logs
    fn name(&self) -> &str;
}

/// Shared LLM client wrapper
pub struct LlmClient {
    agent: Agent<openai::completion::CompletionModel>,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, ProviderError> {
        let base_url = config.base_url.as_deref().unwrap_or(OPENAI_API_BASE_URL);

        let client = openai::CompletionsClient::builder()
            .api_key(api_key)
            .base_url(base_url)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let agent = client
            .agent(&config.model)
            .preamble(TRIAGE_PREAMBLE)
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .build();

        tracing::info!(
            model = %config.model,
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            "LLM client initialized"
        );

        Ok(Self {
            agent,
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let start_time = Instant::now();

        tracing::debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Initiating LLM call for ticket classification"
        );

        let result = tokio::time::timeout(self.timeout, self.agent.prompt(prompt)).await;
        let elapsed_ms = start_time.elapsed().as_millis();

        match result {
            Ok(Ok(response)) => {
                tracing::info!(
                    model = %self.model,
                    elapsed_ms = elapsed_ms,
                    response_length = response.len(),
                    "LLM call for ticket classification completed"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::error!(
                    model = %self.model,
                    elapsed_ms = elapsed_ms,
                    error = %e,
                    "LLM call for ticket classification failed"
                );
                Err(ProviderError::Request(e.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    model = %self.model,
                    elapsed_ms = elapsed_ms,
                    "LLM call for ticket classification timed out"
                );
                Err(ProviderError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}
