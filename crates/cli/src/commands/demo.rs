use serde_json::{json, Value};
use supportdesk_agent::SupportService;
use supportdesk_core::domain::query::CustomerQuery;

use crate::commands::{load_config, CommandResult};

const DEMO_QUERIES: [(&str, &str, &str, &str); 3] = [
    ("Help Request", "Q001", "RETAIL001", "How to reset my password for Retail Giant account?"),
    ("Technical Issue", "Q002", "PHARMA001", "The prescription refill system is not working"),
    ("Urgent Query", "Q003", "BANK001", "URGENT! Suspicious activity on my Global Bank account!"),
];

pub fn run() -> CommandResult {
    let config = match load_config("demo") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let service = SupportService::from_config(&config);
    let mut conversations: Vec<Value> = Vec::with_capacity(DEMO_QUERIES.len());

    for (title, query_id, customer_id, text) in DEMO_QUERIES {
        let response = match service.handle_query(CustomerQuery::new(query_id, customer_id, text))
        {
            Ok(response) => response,
            Err(error) => {
                return CommandResult::failure("demo", "pipeline", error.to_string(), 3);
            }
        };

        conversations.push(json!({
            "title": title,
            "customer_id": customer_id,
            "query": text,
            "response": response.text(),
            "confidence_pct": format!("{:.2}%", response.confidence() * 100.0),
            "requires_escalation": response.requires_escalation(),
            "escalation_reason": response.escalation_reason(),
        }));
    }

    let data = json!({
        "paradigm": service.paradigm().description(),
        "conversations": conversations,
        "active_conversations": service.active_conversation_count(),
    });
    CommandResult::success_with_data("demo", "demo completed successfully", Some(data))
}
