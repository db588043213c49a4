use std::io::Read;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_triage::app::AppState;
use ticket_triage::model::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only the JSON payload
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let state = AppState::new(config)?;

    let ticket_text = read_ticket_text()?;
    tracing::debug!(
        ticket_length = ticket_text.len(),
        offline = state.offline,
        "Triaging ticket"
    );

    let payload = state.triage_service.triage(&ticket_text).await;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

/// Ticket from the command-line arguments, or stdin when none are given
fn read_ticket_text() -> std::io::Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
