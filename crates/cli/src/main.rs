use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tripgenie_api::{build_agent, AppConfig, TripGenieAgent};
use tripgenie_core::{ChatMessage, ChatRequest, Role};
use tripgenie_observability::{init_tracing, AppMetrics};
use tripgenie_travel::TravelData;

#[derive(Debug, Parser)]
#[command(name = "tripgenie")]
#[command(about = "TripGenie travel assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat; history is kept for the session.
    Chat,
    /// Print the intent and city extracted from a message.
    Classify { message: String },
    /// Resolve a city name to its code and coordinates.
    City { name: String },
    Hotels { city: String },
    Attractions { city: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("tripgenie_cli");
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let agent = build_agent(&config, AppMetrics::shared())?;

    match cli.command {
        Command::Chat => run_chat(&agent).await?,
        Command::Classify { message } => {
            let info = agent.classify(&message, &[]).await;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::City { name } => {
            let code = agent.travel().resolve_city_code(&name).await?;
            let point = agent.travel().resolve_city_coordinates(&name).await?;
            let report = json!({
                "city": name,
                "code": code,
                "coordinates": point,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Hotels { city } => {
            let code = agent
                .travel()
                .resolve_city_code(&city)
                .await?
                .with_context(|| format!("no city code found for {city}"))?;
            println!("{}", agent.travel().find_lodging(&code).await);
        }
        Command::Attractions { city } => {
            let point = agent
                .travel()
                .resolve_city_coordinates(&city)
                .await?
                .with_context(|| format!("no coordinates found for {city}"))?;
            println!("{}", agent.travel().find_points_of_interest(point).await);
        }
    }

    Ok(())
}

async fn run_chat(agent: &TripGenieAgent) -> Result<()> {
    let mut history: Vec<ChatMessage> = Vec::new();

    println!("TripGenie chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let request = ChatRequest {
            message: message.to_string(),
            history: history.clone(),
        };
        let reply = agent.handle_chat(&request).await?;
        let text = reply.text();

        println!("\n{text}\n");

        history.push(ChatMessage::new(Role::User, message));
        history.push(ChatMessage::new(Role::Model, text));
    }

    Ok(())
}
