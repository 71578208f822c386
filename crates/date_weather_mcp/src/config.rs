use std::time::Duration;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
pub const DEFAULT_LANGUAGE: &str = "zh";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct Config {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub air_quality_url: String,
    /// Language of geocoding results
    pub language: String,
    /// Applied separately to connecting and to the whole request
    pub timeout: Duration,
    pub user_agent: Option<String>,
    /// IANA timezone overriding system detection
    pub local_timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            local_timezone: None,
        }
    }
}
