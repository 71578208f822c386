use rmcp::ErrorData as McpError;
use rmcp::serde_json::json;

use crate::core::utils::{AVAILABLE_RESOURCES, DEFAULT_PATTERN};

// Error codes
const ERROR_INVALID_TIME_FORMAT: &str = "invalid_time_format";
const ERROR_INVALID_TIMEZONE: &str = "invalid_timezone";
const ERROR_UNSUPPORTED_UNIT: &str = "unsupported_unit";
const ERROR_LOCATION_NOT_FOUND: &str = "location_not_found";
const ERROR_UPSTREAM: &str = "upstream_error";
const ERROR_INVALID_PARAMS: &str = "invalid_params";
const ERROR_RESOURCE_NOT_FOUND: &str = "resource_not_found";

/// Failure kinds surfaced by the date and weather operations
#[derive(Debug, thiserror::Error)]
pub enum DateWeatherError {
    #[error("Invalid time format: {input} ({reason})")]
    InvalidTimeFormat { input: String, reason: String },
    #[error("Invalid timezone: {timezone}")]
    InvalidTimezone { timezone: String },
    #[error("Unsupported time unit: {unit}. Expected years, months, days, hours, minutes or seconds")]
    UnsupportedUnit { unit: String },
    #[error("Location not found: {name}")]
    LocationNotFound { name: String },
    #[error("Upstream {endpoint} request failed: {message}")]
    Upstream { endpoint: String, message: String },
    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },
    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },
}

impl DateWeatherError {
    /// Input text did not match the fixed `yyyy-MM-dd HH:mm:ss` pattern
    pub fn unparsable(input: &str) -> Self {
        Self::InvalidTimeFormat {
            input: input.to_string(),
            reason: format!("expected {}", DEFAULT_PATTERN),
        }
    }

    pub fn upstream(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// Classify a transport error, keeping timeouts distinguishable in the message
    pub fn from_transport(endpoint: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_decode() {
            format!("unexpected response payload: {}", err)
        } else {
            err.to_string()
        };
        Self::upstream(endpoint, message)
    }
}

impl From<DateWeatherError> for McpError {
    fn from(err: DateWeatherError) -> Self {
        match err {
            DateWeatherError::InvalidTimeFormat { input, reason } => McpError::invalid_params(
                ERROR_INVALID_TIME_FORMAT,
                Some(json!({
                    "input": input,
                    "reason": reason,
                    "expected_format": DEFAULT_PATTERN
                })),
            ),
            DateWeatherError::InvalidTimezone { timezone } => McpError::invalid_params(
                ERROR_INVALID_TIMEZONE,
                Some(json!({"timezone": timezone})),
            ),
            DateWeatherError::UnsupportedUnit { unit } => McpError::invalid_params(
                ERROR_UNSUPPORTED_UNIT,
                Some(json!({
                    "unit": unit,
                    "valid_units": ["years", "months", "days", "hours", "minutes", "seconds"]
                })),
            ),
            DateWeatherError::LocationNotFound { name } => McpError::invalid_params(
                ERROR_LOCATION_NOT_FOUND,
                Some(json!({"name": name})),
            ),
            DateWeatherError::Upstream { endpoint, message } => McpError::internal_error(
                ERROR_UPSTREAM,
                Some(json!({"endpoint": endpoint, "message": message})),
            ),
            DateWeatherError::InvalidParams { message } => {
                McpError::invalid_params(ERROR_INVALID_PARAMS, Some(json!({"message": message})))
            }
            DateWeatherError::ResourceNotFound { uri } => McpError::resource_not_found(
                ERROR_RESOURCE_NOT_FOUND,
                Some(json!({
                    "uri": uri,
                    "available_resources": AVAILABLE_RESOURCES
                })),
            ),
        }
    }
}

pub type DateWeatherResult<T> = Result<T, DateWeatherError>;
pub type McpResult<T> = Result<T, McpError>;
