//! Support ticket triage
//!
//! Classifies free-text tickets with a language model, then applies
//! deterministic override rules, scores confidence and decides whether a
//! human has to review the result. [`TriageService::triage`] always returns a
//! well-formed [`FinalPayload`].

pub mod app;
pub mod model;
pub mod service;

pub use model::{Category, ClassificationRecord, Config, FinalPayload, Priority, RulesConfig};
pub use service::{ExtractionError, ProviderError, TextGenerator, TriageService};
