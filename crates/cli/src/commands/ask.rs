use serde_json::json;
use supportdesk_agent::SupportService;
use supportdesk_core::domain::query::CustomerQuery;
use supportdesk_core::errors::{ApplicationError, DomainError};

use crate::commands::{load_config, CommandResult};

#[derive(Clone, Debug)]
pub struct AskArgs {
    pub customer_id: String,
    pub text: String,
    pub query_id: String,
}

pub fn run(args: AskArgs) -> CommandResult {
    let config = match load_config("ask") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let service = SupportService::from_config(&config);
    let query = CustomerQuery::new(args.query_id.clone(), args.customer_id, args.text);

    match service.handle_query_detailed(query) {
        Ok(outcome) => {
            let response = &outcome.response;
            let data = json!({
                "query_id": response.query_id().0,
                "response_id": response.id().0,
                "response": response.text(),
                "confidence": response.confidence(),
                "requires_escalation": response.requires_escalation(),
                "escalation_reason": response.escalation_reason(),
                "intent": outcome.perception.intent,
                "sentiment": outcome.perception.sentiment,
                "urgency": outcome.perception.urgency,
                "keywords": outcome.perception.keywords,
                "strategy": outcome.strategy,
                "planned_actions": outcome.actions,
                "ethics": outcome.validation,
            });
            CommandResult::success_with_data("ask", "query processed", Some(data))
        }
        Err(error) => {
            let error_class = match &error {
                DomainError::FairnessViolation { .. } => "fairness_violation",
                DomainError::ConfidenceOutOfRange { .. } => "pipeline",
            };
            let interface = ApplicationError::from(error).into_interface(args.query_id);
            CommandResult::failure(
                "ask",
                error_class,
                format!("{} ({interface})", interface.user_message()),
                3,
            )
        }
    }
}
