pub mod classification;
pub mod config;
pub mod payload;
pub mod rules;
pub mod ticket;

pub use config::{Config, LlmConfig};
pub use payload::FinalPayload;
pub use rules::{AssigneeRoute, AssigneeTable, Rule, RuleEffect, RuleMatcher, RulesConfig};
pub use ticket::{Category, ClassificationRecord, Priority};
