use rmcp::schemars;
use serde::{Deserialize, Deserializer};

use crate::core::{
    error::{DateWeatherError, DateWeatherResult},
    models::Coordinates,
};

/// Argument checks run by the tool layer before a request reaches the core
pub trait Validate {
    fn validate(&self) -> DateWeatherResult<()>;
}

/// Helper function to deserialize and trim strings
fn deserialize_trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

fn deserialize_trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn require_non_empty(field: &str, value: &str) -> DateWeatherResult<()> {
    if value.is_empty() {
        return Err(DateWeatherError::InvalidParams {
            message: format!("{} is required", field),
        });
    }
    Ok(())
}

/// Request to get the current time in a timezone
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TimeInZoneRequest {
    /// Timezone ID, e.g. Asia/Shanghai, America/New_York, Europe/London, UTC
    #[serde(alias = "zoneId", deserialize_with = "deserialize_trimmed_string")]
    pub zone_id: String,
}

impl Validate for TimeInZoneRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("zone_id", &self.zone_id)
    }
}

/// Request to render an epoch timestamp
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TimestampRequest {
    /// Epoch timestamp in milliseconds, e.g. 1703123456789
    pub timestamp: i64,
}

/// Request carrying a single time in the `yyyy-MM-dd HH:mm:ss` pattern
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateTimeRequest {
    /// Date and time as yyyy-MM-dd HH:mm:ss, e.g. 2023-12-21 10:30:00
    #[serde(alias = "dateTime", deserialize_with = "deserialize_trimmed_string")]
    pub date_time: String,
}

impl Validate for DateTimeRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("date_time", &self.date_time)
    }
}

/// Request to compute the interval between two times
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TimeDifferenceRequest {
    /// Start time as yyyy-MM-dd HH:mm:ss, e.g. 2023-12-21 10:00:00
    #[serde(alias = "startTime", deserialize_with = "deserialize_trimmed_string")]
    pub start_time: String,
    /// End time as yyyy-MM-dd HH:mm:ss, e.g. 2023-12-21 15:30:00
    #[serde(alias = "endTime", deserialize_with = "deserialize_trimmed_string")]
    pub end_time: String,
}

impl Validate for TimeDifferenceRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("start_time", &self.start_time)?;
        require_non_empty("end_time", &self.end_time)
    }
}

/// Request to shift a time by an amount of calendar units
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddTimeRequest {
    /// Base time as yyyy-MM-dd HH:mm:ss, e.g. 2023-12-21 10:00:00
    #[serde(alias = "dateTime", deserialize_with = "deserialize_trimmed_string")]
    pub date_time: String,
    /// Amount to add; negative values subtract, e.g. 5, -3
    pub amount: i32,
    /// Unit: years, months, days, hours, minutes or seconds
    #[serde(deserialize_with = "deserialize_trimmed_string")]
    pub unit: String,
}

impl Validate for AddTimeRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("date_time", &self.date_time)?;
        require_non_empty("unit", &self.unit)
    }
}

/// Request to render a time with a custom pattern
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatDateTimeRequest {
    /// Time to format as yyyy-MM-dd HH:mm:ss, e.g. 2023-12-21 10:30:00
    #[serde(alias = "dateTime", deserialize_with = "deserialize_trimmed_string")]
    pub date_time: String,
    /// Target pattern, e.g. yyyy年MM月dd日, MM/dd/yyyy, HH:mm:ss (strftime such as %Y/%m/%d also works)
    pub pattern: String,
}

impl Validate for FormatDateTimeRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("date_time", &self.date_time)?;
        require_non_empty("pattern", self.pattern.trim())
    }
}

/// Request to test a year for leapness
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LeapYearRequest {
    /// Year to check, e.g. 2024, 2023
    pub year: i32,
}

/// Request naming a place to look up
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CityRequest {
    /// City name in Chinese or English, e.g. 北京, Beijing, 上海, Shanghai, New York
    #[serde(alias = "cityName", deserialize_with = "deserialize_trimmed_string")]
    pub city_name: String,
}

impl Validate for CityRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        require_non_empty("city_name", &self.city_name)
    }
}

/// Request addressing a point by latitude and longitude
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CoordinatesRequest {
    /// Latitude between -90 and 90, e.g. 39.9042
    pub lat: f64,
    /// Longitude between -180 and 180, e.g. 116.4074
    pub lon: f64,
}

impl CoordinatesRequest {
    pub fn coordinates(&self) -> DateWeatherResult<Coordinates> {
        Coordinates::new(self.lat, self.lon)
    }
}

impl Validate for CoordinatesRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        self.coordinates().map(|_| ())
    }
}

/// Request for a forecast by coordinates with an optional display name
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ForecastByCoordinatesRequest {
    /// Latitude between -90 and 90, e.g. 39.9042
    pub lat: f64,
    /// Longitude between -180 and 180, e.g. 116.4074
    pub lon: f64,
    /// Optional city name used as the display label, e.g. 北京
    #[serde(
        default,
        alias = "cityName",
        deserialize_with = "deserialize_trimmed_option"
    )]
    pub city_name: Option<String>,
}

impl ForecastByCoordinatesRequest {
    pub fn coordinates(&self) -> DateWeatherResult<Coordinates> {
        Coordinates::new(self.lat, self.lon)
    }
}

impl Validate for ForecastByCoordinatesRequest {
    fn validate(&self) -> DateWeatherResult<()> {
        self.coordinates().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_trimming() {
        let json = r#"{"zone_id": "   Africa/Cairo   "}"#;
        let request: TimeInZoneRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.zone_id, "Africa/Cairo");

        let json = r#"{
            "start_time": "  2023-12-21 10:00:00 ",
            "end_time": " 2023-12-21 15:30:00  "
        }"#;
        let request: TimeDifferenceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.start_time, "2023-12-21 10:00:00");
        assert_eq!(request.end_time, "2023-12-21 15:30:00");
    }

    #[test]
    fn test_camel_case_aliases() {
        let json = r#"{"dateTime": "2023-12-21 10:00:00", "amount": -3, "unit": "hours"}"#;
        let request: AddTimeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.date_time, "2023-12-21 10:00:00");
        assert_eq!(request.amount, -3);

        let json = r#"{"cityName": " Beijing "}"#;
        let request: CityRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.city_name, "Beijing");
    }

    #[test]
    fn test_empty_fields_rejected() {
        let request = CityRequest {
            city_name: String::new(),
        };
        assert!(matches!(
            request.validate(),
            Err(DateWeatherError::InvalidParams { .. })
        ));

        let request = FormatDateTimeRequest {
            date_time: "2023-12-21 10:00:00".to_string(),
            pattern: "   ".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(CoordinatesRequest { lat: 39.9, lon: 116.4 }.validate().is_ok());
        assert!(CoordinatesRequest { lat: 91.0, lon: 0.0 }.validate().is_err());
        assert!(CoordinatesRequest { lat: 0.0, lon: 181.0 }.validate().is_err());
    }

    #[test]
    fn test_optional_city_name() {
        let json = r#"{"lat": 39.9, "lon": 116.4}"#;
        let request: ForecastByCoordinatesRequest = serde_json::from_str(json).unwrap();
        assert!(request.city_name.is_none());

        let json = r#"{"lat": 39.9, "lon": 116.4, "city_name": "  "}"#;
        let request: ForecastByCoordinatesRequest = serde_json::from_str(json).unwrap();
        assert!(request.city_name.is_none());

        let json = r#"{"lat": 39.9, "lon": 116.4, "city_name": " 北京 "}"#;
        let request: ForecastByCoordinatesRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.city_name.as_deref(), Some("北京"));
    }
}
