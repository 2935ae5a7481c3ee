use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;
use supportdesk_agent::runtime::{LAST_INTENT_KEY, LAST_SENTIMENT_KEY};
use supportdesk_agent::{Intent, SupportService};
use supportdesk_core::audit::InMemoryAuditSink;
use supportdesk_core::config::{AppConfig, EthicsConfig};
use supportdesk_core::domain::query::{CustomerId, CustomerQuery};

#[test]
fn demo_conversations_match_expected_outcomes() {
    let service = SupportService::default();

    let help = service
        .handle_query(CustomerQuery::new(
            "Q001",
            "RETAIL001",
            "How to reset my password for Retail Giant account?",
        ))
        .expect("help request");
    assert!(!help.requires_escalation());

    let technical = service
        .handle_query(CustomerQuery::new(
            "Q002",
            "PHARMA001",
            "The prescription refill system is not working",
        ))
        .expect("technical issue");
    assert!(technical.requires_escalation());
    assert_eq!(technical.escalation_reason(), Some("Urgency: 0.30, Intent: TECHNICAL_ISSUE"));

    let urgent = service
        .handle_query(CustomerQuery::new(
            "Q003",
            "BANK001",
            "URGENT! Suspicious activity on my Global Bank account!",
        ))
        .expect("urgent query");
    assert!(urgent.requires_escalation());
    assert!(urgent.confidence() < 0.8);

    assert_eq!(service.active_conversation_count(), 3);
}

#[test]
fn third_frustrated_message_is_not_yet_escalated_but_fourth_is() {
    let service = SupportService::default();
    let escalations: Vec<_> = (0..4)
        .map(|turn| {
            service
                .handle_query(CustomerQuery::new(format!("Q-{turn}"), "C-ANGRY", "I'm frustrated"))
                .expect("fair query")
                .requires_escalation()
        })
        .collect();

    assert_eq!(escalations, vec![false, false, false, true]);
}

#[test]
fn scratch_keys_track_the_latest_turn() {
    let service = SupportService::default();
    let customer = CustomerId("C-SCRATCH".to_string());

    service
        .handle_query(CustomerQuery::new("Q-1", "C-SCRATCH", "Thanks, great help with setup"))
        .expect("fair");
    service
        .handle_query(CustomerQuery::new("Q-2", "C-SCRATCH", "The export is broken, terrible"))
        .expect("fair");

    let context = service.context(&customer).expect("context exists");
    assert_eq!(context.context_value(LAST_INTENT_KEY), Some(&json!("TECHNICAL_ISSUE")));
    assert_eq!(context.context_value(LAST_SENTIMENT_KEY), Some(&json!("NEGATIVE")));
    assert_eq!(context.response_history().len(), 2);
}

#[test]
fn planned_actions_are_reported_but_do_not_shape_the_text() {
    let service = SupportService::default();
    let outcome = service
        .handle_query_detailed(CustomerQuery::new("Q-1", "C-PLAN", "question about billing"))
        .expect("fair");

    assert_eq!(outcome.perception.intent, Intent::BillingInquiry);
    let tags: Vec<_> = outcome.actions.iter().map(|action| action.as_str()).collect();
    assert_eq!(
        tags,
        vec!["ACKNOWLEDGE_QUERY", "RETRIEVE_BILLING_INFO", "EXPLAIN_CHARGES", "UPDATE_CONTEXT"]
    );
    assert!(!outcome.response.text().contains("RETRIEVE_BILLING_INFO"));
}

#[test]
fn customers_are_processed_in_parallel_without_losing_turns() {
    let service = SupportService::default();
    let customers = 8;
    let turns = 25;
    let barrier = Barrier::new(customers);

    thread::scope(|scope| {
        for customer in 0..customers {
            let service = &service;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for turn in 0..turns {
                    service
                        .handle_query(CustomerQuery::new(
                            format!("Q-{customer}-{turn}"),
                            format!("C-{customer}"),
                            "Where is my order?",
                        ))
                        .expect("fair query");
                }
            });
        }
    });

    assert_eq!(service.active_conversation_count(), customers);
    for customer in 0..customers {
        let context = service.context(&CustomerId(format!("C-{customer}"))).expect("context");
        assert_eq!(context.interaction_count(), turns);
        let expected: Vec<_> = (0..turns).map(|turn| format!("Q-{customer}-{turn}")).collect();
        let actual: Vec<_> = context.query_history().iter().map(|q| q.id().0.clone()).collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn concurrent_turns_for_one_customer_are_serialised() {
    let service = SupportService::default();
    let writers = 8;
    let per_writer = 20;
    let barrier = Barrier::new(writers);

    thread::scope(|scope| {
        for writer in 0..writers {
            let service = &service;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for turn in 0..per_writer {
                    service
                        .handle_query(CustomerQuery::new(
                            format!("Q-{writer}-{turn}"),
                            "C-SHARED",
                            "status update please",
                        ))
                        .expect("fair query");
                }
            });
        }
    });

    let context = service.context(&CustomerId("C-SHARED".to_string())).expect("context");
    assert_eq!(context.interaction_count(), writers * per_writer);
    assert_eq!(context.response_history().len(), writers * per_writer);
    for (query, response) in context.query_history().iter().zip(context.response_history()) {
        assert_eq!(response.query_id(), query.id());
    }
}

#[test]
fn ethics_findings_surface_only_through_audit() {
    let sink = InMemoryAuditSink::default();
    let config = AppConfig {
        ethics: EthicsConfig {
            discriminatory_terms: vec!["Account".to_string()],
            ..EthicsConfig::default()
        },
        ..AppConfig::default()
    };
    let service = SupportService::with_audit_sink(&config, Arc::new(sink.clone()));

    let response = service
        .handle_query(CustomerQuery::new("Q-1", "C-AUDIT", "Why is there a charge?"))
        .expect("advisory findings never block delivery");

    assert!(response.text().contains("charges on your account"));
    let flagged = sink.events_of_type("agent.ethics.flagged");
    assert_eq!(flagged.len(), 1);
    assert_eq!(
        flagged[0].metadata.get("issues").map(String::as_str),
        Some("discriminatory_content")
    );
    assert_eq!(sink.events_of_type("agent.turn.completed").len(), 1);
    assert_eq!(sink.events_of_type("session.context.created").len(), 1);
}
