pub mod extraction;
pub mod llm;
pub mod rules;
pub mod stub;
pub mod triage;

pub use extraction::{ExtractionError, Extractor};
pub use llm::{LlmClient, ProviderError, TextGenerator};
pub use rules::RulesEngine;
pub use stub::StubGenerator;
pub use triage::TriageService;
