//! Nexus System binary entrypoint.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use nexus_core::Event;
use nexus_system::cli::{Cli, Commands};
use nexus_system::commands;
use nexus_system::models::event::{generate_id, NewEvent};
use nexus_system::models::response::SuggestRequest;
use nexus_system::storage::ConfigService;
use nexus_system::{AppError, AppResult, AppState, CommandResponse};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli) -> AppResult<bool> {
    if let Commands::Health = cli.command {
        return print(&commands::get_health().await);
    }

    let config = ConfigService::load(cli.config)?;
    let state = AppState::initialize(config)?;

    match cli.command {
        Commands::Analyze { input } => {
            let event = parse_event(&read_input(&input)?)?;
            print(&commands::analyze_event(&state, event).await)
        }
        Commands::Ingest { input } => {
            let event: NewEvent = serde_json::from_str(&read_input(&input)?)?;
            print(&commands::ingest_event(&state, event).await)
        }
        Commands::Sample => print(&commands::create_sample(&state).await),
        Commands::Suggest { event_id } => {
            print(&commands::suggest(&state, SuggestRequest::for_event(event_id)).await)
        }
        Commands::Events { limit } => print(&commands::list_events(&state, limit).await),
        Commands::Suggestions { event_id } => {
            print(&commands::list_event_suggestions(&state, &event_id).await)
        }
        Commands::Status => print(&commands::get_status(&state).await),
        Commands::Health => print(&commands::get_health().await),
    }
}

fn read_input(input: &str) -> AppResult<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Accepts `{id, payload, meta}`; a missing id is generated.
fn parse_event(raw: &str) -> AppResult<Event> {
    let mut value: serde_json::Value = serde_json::from_str(raw)?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| AppError::validation("event must be a JSON object"))?;
    if !obj.contains_key("id") {
        obj.insert("id".to_string(), generate_id("ev").into());
    }
    Ok(serde_json::from_value(value)?)
}

fn print<T: Serialize>(response: &CommandResponse<T>) -> AppResult<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.success)
}
