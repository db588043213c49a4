use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::model::RulesConfig;

const ENV_CONFIG_PATH: &str = "TRIAGE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "triage.yaml";

const ENV_MODEL: &str = "TRIAGE_MODEL";
const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "TRIAGE_LLM_TIMEOUT_SECS";
const ENV_OFFLINE: &str = "TRIAGE_OFFLINE";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the text generation client
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub model: String,
    /// OpenAI-compatible endpoint override
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: 350,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub rules: RulesConfig,
    pub llm: LlmConfig,
    /// Use the deterministic offline generator instead of the LLM
    pub offline: bool,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let llm = LlmConfig {
            model: std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var(ENV_BASE_URL).ok().filter(|u| !u.trim().is_empty()),
            timeout_secs: std::env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ..LlmConfig::default()
        };

        let offline = std::env::var(ENV_OFFLINE)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self {
            rules: load_rules(Path::new(&config_path)),
            llm,
            offline,
        }
    }
}

/// Rules section of the YAML file at `path`, or the built-in rules when the
/// file is absent, blank or unusable
fn load_rules(path: &Path) -> RulesConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No rules file, using built-in rules");
            return RulesConfig::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Rules file unreadable, using built-in rules");
            return RulesConfig::default();
        }
    };

    if contents.trim().is_empty() {
        tracing::debug!(path = %path.display(), "Rules file is blank, using built-in rules");
        return RulesConfig::default();
    }

    match serde_yaml::from_str::<ConfigFile>(&contents) {
        Ok(file) => {
            tracing::info!(
                path = %path.display(),
                rules = file.rules.rules.len(),
                review_threshold = file.rules.review_threshold,
                "Loaded triage rules"
            );
            file.rules
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid rules file, using built-in rules");
            RulesConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
