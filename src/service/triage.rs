//! Ticket triage entry point
//!
//! Runs extraction then the rules pass. Always yields a payload; every
//! failure is encoded in `error` and `needs_human_review`.

use std::sync::Arc;
use std::time::Instant;

use crate::model::{FinalPayload, RulesConfig};
use crate::service::extraction::Extractor;
use crate::service::llm::TextGenerator;
use crate::service::rules::RulesEngine;

/// Service combining the extractor and the rules engine
pub struct TriageService {
    extractor: Extractor,
    rules: RulesEngine,
}

impl TriageService {
    pub fn new(generator: Arc<dyn TextGenerator>, rules_config: Arc<RulesConfig>) -> Self {
        tracing::info!(
            generator = %generator.name(),
            rules = rules_config.rules.len(),
            "Triage service initialized"
        );

        Self {
            extractor: Extractor::new(generator),
            rules: RulesEngine::new(rules_config),
        }
    }

    /// Classify one ticket into a final payload
    pub async fn triage(&self, ticket_text: &str) -> FinalPayload {
        let start_time = Instant::now();

        let extraction = self.extractor.extract(ticket_text).await;
        let payload = self.rules.apply_rules(ticket_text, extraction.as_ref());

        tracing::info!(
            category = %payload.category,
            priority = %payload.priority,
            assignee = %payload.suggested_assignee,
            confidence = payload.confidence,
            needs_human_review = payload.needs_human_review,
            error = payload.error.as_deref().unwrap_or(""),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Ticket triaged"
        );

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Priority};
    use crate::service::rules::FALLBACK_MARKER;
    use crate::service::stub::StubGenerator;
    use proptest::prelude::*;
    use serde_json::json;

    const BILLING_TICKET: &str = "Payment failed when attempting to checkout. I was charged twice and need a refund. The invoice number is INV-12345.";
    const BUG_TICKET: &str = "The web app returns Error 500 when I try to save my profile. The page just crashes every time and I'm seeing 'internal server error' in the console.";
    const GENERAL_TICKET: &str = "How do I update my account email? I don't see an option in settings. Is there documentation?";

    fn service(generator: StubGenerator) -> TriageService {
        TriageService::new(Arc::new(generator), Arc::new(RulesConfig::default()))
    }

    fn assert_well_formed(payload: &FinalPayload) {
        assert!((0.0..=1.0).contains(&payload.confidence));
        assert!(!payload.summary.is_empty());
        assert!(!payload.suggested_assignee.is_empty());
        assert!(!payload.explanation.is_empty());
        if payload.error.is_some() {
            assert!(payload.needs_human_review);
        }
    }

    #[tokio::test]
    async fn test_outage_scenario_overrides_model_category() {
        let triage = service(StubGenerator::responding(
            r#"{"summary":["Users cannot reach the app","Started this morning","Affects everyone"],"priority":"Low","category":"Feature"}"#,
        ));

        let payload = triage.triage("system is down for all users").await;

        assert_eq!(payload.category, Category::Bug);
        assert_eq!(payload.priority, Priority::High);
        assert!(payload.rules_applied.iter().any(|r| r == "outage_keywords"));
        assert_eq!(payload.error, None);
        assert_well_formed(&payload);
    }

    #[tokio::test]
    async fn test_lowercase_category_is_normalized() {
        let triage = service(StubGenerator::responding(
            r#"{"summary":["Asks about plan pricing","Wants a quote","Team of 20"],"priority":"Low","category":"billing"}"#,
        ));

        let payload = triage
            .triage("What would the yearly plan cost for a team of twenty people?")
            .await;

        assert_eq!(payload.category, Category::Billing);
        assert_eq!(payload.priority, Priority::Low);
        assert_eq!(payload.suggested_assignee, "Billing Team");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["category"], "Billing");
    }

    #[tokio::test]
    async fn test_malformed_response_falls_back() {
        let triage = service(StubGenerator::responding(
            "This is not JSON at all. Just plain text.",
        ));

        let payload = triage.triage(BUG_TICKET).await;

        assert!(payload.error.as_deref().unwrap().starts_with("invalid_json:"));
        assert!(payload.needs_human_review);
        assert!(payload.rules_applied.iter().any(|r| r == FALLBACK_MARKER));
        assert_well_formed(&payload);
    }

    #[tokio::test]
    async fn test_malformed_response_without_rule_hits_keeps_fallback_values() {
        let triage = service(StubGenerator::responding("{\"summary\": ["));

        let payload = triage.triage(GENERAL_TICKET).await;

        assert_eq!(payload.category, Category::General);
        assert_eq!(payload.priority, Priority::Medium);
        assert!(payload.error.is_some());
        assert!(payload.needs_human_review);
    }

    #[tokio::test]
    async fn test_provider_failure_requires_review() {
        let triage = service(StubGenerator::failing("connection reset by peer"));

        let payload = triage.triage(GENERAL_TICKET).await;

        assert!(payload.needs_human_review);
        let error = payload.error.as_deref().unwrap();
        assert!(error.starts_with("llm_call_failed:"));
        assert!(error.contains("connection reset by peer"));
        assert_well_formed(&payload);
    }

    #[tokio::test]
    async fn test_empty_ticket_yields_stable_payload() {
        let stub = Arc::new(StubGenerator::heuristic());
        let triage = TriageService::new(stub.clone(), Arc::new(RulesConfig::default()));

        let payload = triage.triage("").await;

        assert_eq!(payload.error.as_deref(), Some("empty_ticket_text"));
        assert!(payload.needs_human_review);
        assert_eq!(payload.category, Category::General);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_offline_heuristic_samples_are_well_formed() {
        let triage = service(StubGenerator::heuristic());

        for ticket in [BILLING_TICKET, BUG_TICKET, GENERAL_TICKET] {
            let payload = triage.triage(ticket).await;
            assert_eq!(payload.error, None, "ticket: {}", ticket);
            assert_well_formed(&payload);
        }

        let billing = triage.triage(BILLING_TICKET).await;
        assert_eq!(billing.category, Category::Billing);
    }

    #[tokio::test]
    async fn test_payload_serializes_as_flat_object() {
        let triage = service(StubGenerator::failing("offline"));
        let payload = triage.triage(GENERAL_TICKET).await;

        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "summary",
            "category",
            "priority",
            "suggested_assignee",
            "confidence",
            "needs_human_review",
            "rules_applied",
            "explanation",
            "error",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
        assert!(object.values().all(|v| !v.is_object()));
    }

    fn ticket_strategy() -> impl Strategy<Value = String> {
        let keyword = prop::sample::select(vec![
            "system is down",
            "refund",
            "urgent",
            "error 500",
            "can you add",
            "invoice",
            "asap",
        ]);
        prop_oneof![
            "\\PC{0,120}",
            ("\\PC{0,40}", keyword, "\\PC{0,40}")
                .prop_map(|(before, keyword, after)| format!("{before} {keyword} {after}")),
        ]
    }

    fn response_strategy() -> impl Strategy<Value = String> {
        let category = prop_oneof![
            Just("Billing".to_string()),
            Just("bug".to_string()),
            Just(" FEATURE ".to_string()),
            Just("General".to_string()),
            "[A-Za-z]{0,8}",
        ];
        let priority = prop_oneof![
            Just("Low".to_string()),
            Just("high".to_string()),
            Just("Medium".to_string()),
            "[A-Za-z]{0,8}",
        ];
        let summary = prop::collection::vec("\\PC{0,20}", 0..7);
        let shaped = (summary, category, priority).prop_map(|(summary, category, priority)| {
            json!({"summary": summary, "category": category, "priority": priority}).to_string()
        });
        prop_oneof![shaped, "\\PC{0,80}"]
    }

    proptest! {
        #[test]
        fn test_triage_payload_stays_in_domain(
            ticket in ticket_strategy(),
            response in response_strategy(),
            provider_down in any::<bool>(),
        ) {
            let generator = if provider_down {
                StubGenerator::failing("connection refused")
            } else {
                StubGenerator::responding(response)
            };
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let payload = runtime.block_on(service(generator).triage(&ticket));

            prop_assert!(Category::ALL.contains(&payload.category));
            prop_assert!(Priority::ALL.contains(&payload.priority));
            prop_assert!((0.0..=1.0).contains(&payload.confidence));
            prop_assert_eq!((payload.confidence * 100.0).round() / 100.0, payload.confidence);
            prop_assert!(!payload.summary.is_empty() && payload.summary.len() <= 5);
            prop_assert!(!payload.suggested_assignee.is_empty());
            prop_assert!(!payload.explanation.is_empty());
            if payload.error.is_some() {
                prop_assert!(payload.needs_human_review);
                prop_assert!(payload.rules_applied.iter().any(|r| r == FALLBACK_MARKER));
            }
            if provider_down {
                prop_assert!(payload.error.is_some());
            }
        }
    }
}
