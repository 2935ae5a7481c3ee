use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use supportdesk_agent::SupportService;
use supportdesk_core::config::AppConfig;
use supportdesk_core::domain::query::CustomerQuery;
use tokio::task::JoinSet;
use tracing::info;

use crate::commands::{load_config, CommandResult};

const SAMPLE_MESSAGES: [&str; 6] = [
    "How to update my shipping address?",
    "Question about the billing on my last invoice",
    "The mobile app is not working since the update",
    "Thank you, that was great help",
    "I'm frustrated, this is still broken",
    "I want my money back immediately!",
];

#[derive(Clone, Copy, Debug)]
pub struct SimulateArgs {
    pub customers: usize,
    pub turns: usize,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SimulationSummary {
    pub customers: usize,
    pub turns_per_customer: usize,
    pub total_turns: usize,
    pub escalations: usize,
    pub active_conversations: usize,
}

pub fn run(args: SimulateArgs) -> CommandResult {
    if args.customers == 0 || args.turns == 0 {
        return CommandResult::failure(
            "simulate",
            "invalid_arguments",
            "--customers and --turns must both be greater than zero",
            2,
        );
    }

    let config = match load_config("simulate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(simulate(&config, args)) {
        Ok(summary) => CommandResult::success_with_data(
            "simulate",
            "simulation completed",
            Some(json!(summary)),
        ),
        Err(error) => CommandResult::failure("simulate", "pipeline", format!("{error:#}"), 4),
    }
}

/// Each customer gets its own blocking task; its turns run in order while
/// customers proceed in parallel.
pub async fn simulate(config: &AppConfig, args: SimulateArgs) -> Result<SimulationSummary> {
    let service = Arc::new(SupportService::from_config(config));
    let mut tasks = JoinSet::new();

    for customer in 0..args.customers {
        let service = Arc::clone(&service);
        tasks.spawn_blocking(move || -> Result<usize> {
            let customer_id = format!("SIM-{customer:04}");
            let mut escalations = 0;
            for turn in 0..args.turns {
                let text = SAMPLE_MESSAGES[(customer + turn) % SAMPLE_MESSAGES.len()];
                let query =
                    CustomerQuery::new(format!("{customer_id}-Q{turn}"), customer_id.clone(), text);
                let response = service
                    .handle_query(query)
                    .with_context(|| format!("turn {turn} failed for {customer_id}"))?;
                if response.requires_escalation() {
                    escalations += 1;
                }
            }
            Ok(escalations)
        });
    }

    let mut summary = SimulationSummary {
        customers: args.customers,
        turns_per_customer: args.turns,
        ..SimulationSummary::default()
    };
    while let Some(joined) = tasks.join_next().await {
        let escalations = joined.context("simulation worker panicked")??;
        summary.escalations += escalations;
        summary.total_turns += args.turns;
    }
    summary.active_conversations = service.active_conversation_count();

    info!(
        event_name = "cli.simulate.completed",
        customers = summary.customers,
        total_turns = summary.total_turns,
        escalations = summary.escalations,
        "simulation completed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use supportdesk_core::config::AppConfig;

    use super::{simulate, SimulateArgs};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_customer_gets_its_own_context() {
        let summary = simulate(&AppConfig::default(), SimulateArgs { customers: 6, turns: 6 })
            .await
            .expect("simulation should succeed");

        assert_eq!(summary.active_conversations, 6);
        assert_eq!(summary.total_turns, 36);
        assert!(summary.escalations > 0);
        assert!(summary.escalations < summary.total_turns);
    }

    #[tokio::test]
    async fn escalation_count_is_deterministic() {
        let args = SimulateArgs { customers: 3, turns: 4 };
        let first = simulate(&AppConfig::default(), args).await.expect("first run");
        let second = simulate(&AppConfig::default(), args).await.expect("second run");
        assert_eq!(first, second);
    }
}
