use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use travel_planner::api::AppState;
use travel_planner::chat::{ChatRelay, ChatSession, GREETING, TurnOutcome};
use travel_planner::models::TripRequestDraft;
use travel_planner::{
    HttpModelGateway, ItineraryAssembler, ModelGateway, PlannerConfig, PlannerError, telemetry,
    web,
};

#[derive(Parser)]
#[command(name = "travel-planner", version, about = "AI travel itinerary planner")]
struct Cli {
    /// Configuration file (defaults to <config dir>/travel-planner/config.toml)
    #[arg(short, long, global = true, env = "PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate one trip plan and print it as JSON
    Plan {
        #[arg(short, long)]
        destination: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Comma-separated interest tags, e.g. historical,culinary
        #[arg(short, long, value_delimiter = ',', required = true)]
        interests: Vec<String>,
        /// solo, couple, family or friends
        #[arg(short, long, default_value = "solo")]
        travel_with: String,
        /// Fix the weather values of an offline plan
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Chat with the travel assistant in the terminal
    Chat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PlannerError>() {
                Some(planner_err) => eprintln!("{}", planner_err.user_message()),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = PlannerConfig::load_from_path(cli.config)
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let _telemetry = telemetry::init(&config.logging)?;

    let gateway: Arc<dyn ModelGateway> = Arc::new(
        HttpModelGateway::from_config(&config.model).context("Failed to set up model gateway")?,
    );

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            web::run(&config.server, AppState::new(gateway, &config.server)).await
        }
        Command::Plan {
            destination,
            start,
            end,
            interests,
            travel_with,
            seed,
        } => {
            let draft = TripRequestDraft {
                destination: Some(destination),
                start_date: Some(start),
                end_date: Some(end),
                interests: Some(interests),
                travel_with: Some(travel_with),
            };
            let mut assembler = ItineraryAssembler::new(gateway);
            if let Some(seed) = seed {
                assembler = assembler.with_weather_seed(seed);
            }

            let plan = assembler
                .generate_raw(&draft)
                .await
                .map_err(PlannerError::from)?;
            let json = serde_json::to_string_pretty(&plan).context("Failed to encode plan")?;
            println!("{json}");
            Ok(())
        }
        Command::Chat => chat(ChatRelay::new(gateway)).await,
    }
}

async fn chat(relay: ChatRelay) -> Result<()> {
    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{GREETING}");
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        // Ctrl-C stops the current reply, not the session
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let outcome = relay
            .submit(&mut session, line, &cancel, |token| {
                print!("{token}");
                let _ = std::io::stdout().flush();
            })
            .await;
        watcher.abort();

        match outcome {
            TurnOutcome::Completed => println!(),
            TurnOutcome::Cancelled => println!("\n[reply cancelled]"),
            TurnOutcome::Failed => {
                if let Some(last) = session.messages().last() {
                    println!("\n{}", last.content);
                }
            }
        }
    }

    info!(messages = session.messages().len(), "Chat session ended");
    Ok(())
}
