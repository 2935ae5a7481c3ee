pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use supportdesk_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing::Level;

use crate::commands::{ask::AskArgs, simulate::SimulateArgs, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "supportdesk",
    about = "Supportdesk customer-support agent CLI",
    long_about = "Run customer queries through the perception, reasoning, planning and ethics pipeline.",
    after_help = "Examples:\n  supportdesk ask --customer CUST-1 --text \"My invoice is wrong\"\n  supportdesk demo\n  supportdesk simulate --customers 8 --turns 10"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Process a single customer query and print the turn as JSON")]
    Ask {
        #[arg(long = "customer", help = "Customer identifier owning the conversation")]
        customer_id: String,
        #[arg(long, help = "Free-form query text")]
        text: String,
        #[arg(long = "query-id", default_value = "Q-CLI-1", help = "Query identifier")]
        query_id: String,
    },
    #[command(about = "Run the three canned demo conversations")]
    Demo,
    #[command(about = "Drive many customers through the pipeline concurrently")]
    Simulate {
        #[arg(long, default_value_t = 8, help = "Number of distinct customers")]
        customers: usize,
        #[arg(long, default_value_t = 5, help = "Turns per customer")]
        turns: usize,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Ask { customer_id, text, query_id } => {
            commands::ask::run(AskArgs { customer_id, text, query_id })
        }
        Command::Demo => commands::demo::run(),
        Command::Simulate { customers, turns } => {
            commands::simulate::run(SimulateArgs { customers, turns })
        }
        Command::Config => CommandResult { exit_code: 0, output: commands::config::run() },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a clean JSON payload.
fn init_logging(config: &AppConfig) {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
