use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::{OllamaClient, YahooClient};
use commands::{AppContext, Outcome};
use config::AppConfig;
use models::SessionState;
use services::analysis_service;

const PROMPT: &str = "chartsage> ";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so replies on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("chartsage=debug".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting chartsage v{}", env!("CARGO_PKG_VERSION"));
    info!("  Stock charts, technical indicators and vision-model analysis");

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let provider = match YahooClient::with_base_url(config.yahoo_base_url.clone(), config.http_timeout) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create price data client: {}", e);
            return;
        }
    };
    let model_client = match OllamaClient::new(&config.ollama_host, config.http_timeout) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create model client: {}", e);
            return;
        }
    };

    info!("Checking model server at {}...", model_client.host());
    match analysis_service::preflight(&model_client, &config.models).await {
        Ok(missing) if missing.is_empty() => info!("✓ All configured models are available"),
        Ok(missing) => warn!("{} configured model(s) missing; analysis with them will fail", missing.len()),
        Err(e) => {
            error!("Error connecting to the model server: {}", e);
            return;
        }
    }

    let mut state = SessionState::new(&config.default_symbol, config.default_start, config.default_end);
    let ctx = AppContext {
        config,
        provider: Box::new(provider),
        model_client: Box::new(model_client),
    };

    println!("{}", commands::help::execute());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", PROMPT);
        if let Err(e) = std::io::stdout().flush() {
            warn!("Failed to flush stdout: {}", e);
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match commands::handle_line(&ctx, &mut state, &line).await {
            Outcome::Reply(reply) => println!("{}", reply),
            Outcome::Quit => break,
            Outcome::Ignored => {}
        }
    }

    info!("👋 Shutting down");
}
