use std::env;
use tracing_subscriber::{self, EnvFilter};

mod cli;
mod config;
mod core;
mod server;
mod weather;

use cli::Cli;

/// Date & Weather MCP Server
///
/// Exposes date/time utilities and Open-Meteo weather lookups over stdio:
/// - Tools: Clock queries, conversions, arithmetic, weather and air quality
/// - Resources: Server status and help documentation
///
/// Usage: npx @modelcontextprotocol/inspector cargo run --bin mcp-server-date-weather
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse_config();

    // Logging stays off unless LOG_LEVEL is set; stdout carries the protocol
    if let Ok(log_level) = env::var("LOG_LEVEL") {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
            )
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();

        tracing::info!(
            "Starting Date & Weather MCP server with log level: {}",
            log_level
        );
        tracing::debug!("Configuration: {:?}", config);
    }

    if let Err(e) = server::run(config).await {
        if env::var("LOG_LEVEL").is_ok() {
            tracing::error!("Error running Date & Weather MCP server: {}", e);
        }
        return Err(e);
    }

    Ok(())
}
