use std::time::Duration;

use clap::Parser;

use crate::config::{
    Config, DEFAULT_AIR_QUALITY_URL, DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL,
    DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECS,
};

/// Date & Weather MCP Server
///
/// A Model Context Protocol server exposing date/time arithmetic and
/// Open-Meteo weather, forecast and air-quality lookups as tools.
///
/// ## Development
/// ```bash
/// npx @modelcontextprotocol/inspector cargo run --bin mcp-server-date-weather
/// ```
///
/// ## Configuration
/// Add to your MCP client configuration:
/// ```json
/// {
///   "mcpServers": {
///     "date-weather": {
///       "command": "mcp-server-date-weather",
///       "args": ["--local-timezone", "Asia/Shanghai"],
///       "env": {
///         "LOG_LEVEL": "info"
///       }
///     }
///   }
/// }
/// ```
///
/// ## Environment Variables
/// - `LOG_LEVEL`: Enables logging at the given level (trace, debug, info, warn, error)
/// - `RUST_LOG`: Fine-grained filter, takes precedence over `LOG_LEVEL` once logging is on
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-server-date-weather")]
#[command(about = "MCP server for date/time operations and weather lookups")]
#[command(version)]
pub struct Cli {
    /// Geocoding endpoint used to resolve city names
    #[arg(long, env = "GEOCODING_URL", default_value = DEFAULT_GEOCODING_URL)]
    pub geocoding_url: String,

    /// Forecast endpoint used for current conditions and daily forecasts
    #[arg(long, env = "FORECAST_URL", default_value = DEFAULT_FORECAST_URL)]
    pub forecast_url: String,

    /// Air quality endpoint
    #[arg(long, env = "AIR_QUALITY_URL", default_value = DEFAULT_AIR_QUALITY_URL)]
    pub air_quality_url: String,

    /// Language of geocoding results
    #[arg(long, env = "GEOCODING_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Connect and request timeout for provider calls, in seconds
    #[arg(
        long,
        env = "HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// IANA timezone to treat as local instead of the detected system timezone
    #[arg(long, env = "LOCAL_TIMEZONE")]
    pub local_timezone: Option<String>,

    /// Custom User-Agent string to use for provider requests
    #[arg(long, env = "HTTP_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    /// Parse CLI arguments and convert to configuration
    pub fn parse_config() -> Config {
        Self::parse().into_config()
    }

    pub fn into_config(self) -> Config {
        Config {
            geocoding_url: self.geocoding_url,
            forecast_url: self.forecast_url,
            air_quality_url: self.air_quality_url,
            language: self.language,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent,
            local_timezone: self.local_timezone,
        }
    }
}
