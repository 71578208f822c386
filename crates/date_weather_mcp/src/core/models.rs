use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::core::error::{DateWeatherError, DateWeatherResult};
use crate::core::utils::format_datetime;

/// Label used when a weather result was requested by coordinates alone
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// Wall-clock time rendered in the fixed `yyyy-MM-dd HH:mm:ss` pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeValue {
    /// Date and time, `yyyy-MM-dd HH:mm:ss`
    pub datetime: String,
    /// IANA timezone the value is expressed in; absent for floating wall-clock values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl TimeValue {
    /// Create a TimeValue from a timezone-aware datetime
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>, timezone_name: &str) -> TimeValue {
        TimeValue {
            datetime: format_datetime(&dt.naive_local()),
            timezone: Some(timezone_name.to_string()),
        }
    }

    /// Wall-clock value that is not attached to any timezone
    pub fn floating(dt: &NaiveDateTime) -> TimeValue {
        TimeValue {
            datetime: format_datetime(dt),
            timezone: None,
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.datetime)
    }
}

/// Sub-day breakdown of an interval: whole days plus hours % 24, minutes % 60, seconds % 60
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct IntervalBreakdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Signed duration between two points in time (`end - start`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Interval {
    /// Whole days
    pub days: i64,
    /// Whole hours
    pub hours: i64,
    /// Whole minutes
    pub minutes: i64,
    /// Whole seconds
    pub seconds: i64,
    pub milliseconds: i64,
    /// Remainder breakdown derived from the same endpoints as the totals
    pub breakdown: IntervalBreakdown,
    /// Readable summary of the breakdown
    pub detailed: String,
}

/// Snapshot of every calendar query, taken from a single clock reading
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullTimeInfo {
    pub current_time: String,
    pub current_utc_time: String,
    pub timezone: String,
    pub timestamp: i64,
    pub timestamp_seconds: i64,
    pub day_of_week: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap_year: bool,
}

/// Geographic position of a weather lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in metres, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> DateWeatherResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DateWeatherError::InvalidParams {
                message: format!("latitude must be between -90 and 90, got {}", latitude),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DateWeatherError::InvalidParams {
                message: format!("longitude must be between -180 and 180, got {}", longitude),
            });
        }

        Ok(Self {
            latitude,
            longitude,
            elevation: None,
        })
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Air temperature at 2 m, °C
    pub temperature: f64,
    /// Apparent temperature, °C
    pub feels_like: f64,
    /// Relative humidity, %
    pub humidity: f64,
    /// Surface pressure, hPa
    pub pressure: f64,
    /// Wind speed at 10 m, km/h
    pub wind_speed: f64,
    /// Wind direction at 10 m, degrees
    pub wind_direction: f64,
    /// Precipitation, mm
    pub precipitation: f64,
    pub weather_code: i32,
    pub description: String,
    /// Observation time reported by the provider
    pub update_time: String,
}

/// One day of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub weather_code: i32,
    pub description: String,
}

/// Daily forecast for a location, in the provider's chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Forecast {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub forecast: Vec<ForecastDay>,
}

/// Qualitative air quality derived from PM2.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    #[serde(rename = "very poor")]
    VeryPoor,
}

impl AirQualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AirQualityLevel::Excellent => "excellent",
            AirQualityLevel::Good => "good",
            AirQualityLevel::Moderate => "moderate",
            AirQualityLevel::Poor => "poor",
            AirQualityLevel::VeryPoor => "very poor",
        }
    }
}

impl fmt::Display for AirQualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pollutant concentrations at a location, μg/m³
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReading {
    pub latitude: f64,
    pub longitude: f64,
    pub pm10: f64,
    #[serde(rename = "pm2_5")]
    pub pm2_5: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub update_time: String,
    pub aqi_level: AirQualityLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_value_serialization() {
        let value = TimeValue {
            datetime: "2024-01-01 12:00:00".to_string(),
            timezone: Some("UTC".to_string()),
        };

        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("2024-01-01 12:00:00"));
        assert!(json.contains("UTC"));

        let floating = serde_json::to_string(&TimeValue {
            datetime: "2024-01-01 12:00:00".to_string(),
            timezone: None,
        })
        .unwrap();
        assert!(!floating.contains("timezone"));
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.01, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_air_quality_level_names() {
        assert_eq!(AirQualityLevel::VeryPoor.to_string(), "very poor");
        assert_eq!(
            serde_json::to_string(&AirQualityLevel::VeryPoor).unwrap(),
            "\"very poor\""
        );
        assert_eq!(
            serde_json::to_string(&AirQualityLevel::Moderate).unwrap(),
            "\"moderate\""
        );
    }

    #[test]
    fn test_weather_snapshot_uses_camel_case() {
        let snapshot = WeatherSnapshot {
            city: UNKNOWN_LOCATION.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            temperature: 3.0,
            feels_like: 4.0,
            humidity: 50.0,
            pressure: 1000.0,
            wind_speed: 5.0,
            wind_direction: 90.0,
            precipitation: 0.0,
            weather_code: 0,
            description: "clear".to_string(),
            update_time: "2024-01-01T12:00".to_string(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("feelsLike"));
        assert!(json.contains("updateTime"));
        assert!(json.contains("unknown location"));
    }
}
