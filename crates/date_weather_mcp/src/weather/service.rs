use std::sync::Arc;

use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::core::{
    error::{DateWeatherError, DateWeatherResult},
    models::{
        AirQualityReading, Coordinates, Forecast, ForecastDay, UNKNOWN_LOCATION, WeatherSnapshot,
    },
    temporal::today_in,
    utils::DATE_FORMAT,
};
use crate::weather::{
    client::{build_client, get_json},
    codes::{air_quality_level, describe_weather_code},
    geocoding::{GeocodingService, LocationResolver},
};

const FORECAST_ENDPOINT: &str = "forecast";
const AIR_QUALITY_ENDPOINT: &str = "air quality";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,surface_pressure,wind_speed_10m,wind_direction_10m";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";
const AIR_QUALITY_FIELDS: &str = "pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,ozone";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i32,
    surface_pressure: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailySeries,
}

/// Parallel per-day arrays; index `i` of every array describes the same day
#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weather_code: Vec<i32>,
    precipitation_sum: Vec<f64>,
    wind_speed_10m_max: Vec<f64>,
}

impl DailySeries {
    fn into_days(self) -> DateWeatherResult<Vec<ForecastDay>> {
        let expected = self.time.len();
        let lengths = [
            ("temperature_2m_max", self.temperature_2m_max.len()),
            ("temperature_2m_min", self.temperature_2m_min.len()),
            ("weather_code", self.weather_code.len()),
            ("precipitation_sum", self.precipitation_sum.len()),
            ("wind_speed_10m_max", self.wind_speed_10m_max.len()),
        ];
        if let Some((field, len)) = lengths.iter().find(|(_, len)| *len != expected) {
            return Err(DateWeatherError::upstream(
                FORECAST_ENDPOINT,
                format!(
                    "daily.{} has {} entries but daily.time has {}",
                    field, len, expected
                ),
            ));
        }

        let days = self
            .time
            .into_iter()
            .zip(self.temperature_2m_max)
            .zip(self.temperature_2m_min)
            .zip(self.weather_code)
            .zip(self.precipitation_sum)
            .zip(self.wind_speed_10m_max)
            .map(
                |(((((date, max_temp), min_temp), weather_code), precipitation), wind_speed)| {
                    ForecastDay {
                        date,
                        max_temp,
                        min_temp,
                        precipitation,
                        wind_speed,
                        weather_code,
                        description: describe_weather_code(weather_code).to_string(),
                    }
                },
            )
            .collect();

        Ok(days)
    }
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: AirQualityCurrent,
}

#[derive(Debug, Deserialize)]
struct AirQualityCurrent {
    time: String,
    pm10: f64,
    pm2_5: f64,
    carbon_monoxide: f64,
    nitrogen_dioxide: f64,
    ozone: f64,
}

/// Fetches and normalizes weather, forecast and air quality data.
///
/// Every call is a single request/response round trip; the only state held
/// is the pooled HTTP client and the endpoint configuration.
#[derive(Clone)]
pub struct WeatherService {
    client: Client,
    forecast_url: String,
    air_quality_url: String,
    resolver: Arc<dyn LocationResolver>,
    local_timezone: Tz,
}

impl WeatherService {
    /// Service backed by the configured geocoding endpoint
    pub fn new(config: &Config, local_timezone: Tz) -> DateWeatherResult<Self> {
        let client = build_client(config)?;
        let resolver = Arc::new(GeocodingService::new(client.clone(), config));
        Ok(Self::with_resolver(client, config, resolver, local_timezone))
    }

    pub fn with_resolver(
        client: Client,
        config: &Config,
        resolver: Arc<dyn LocationResolver>,
        local_timezone: Tz,
    ) -> Self {
        Self {
            client,
            forecast_url: config.forecast_url.clone(),
            air_quality_url: config.air_quality_url.clone(),
            resolver,
            local_timezone,
        }
    }

    pub async fn current_weather(&self, name: &str) -> DateWeatherResult<WeatherSnapshot> {
        let coordinates = self.resolver.resolve(name).await?;
        self.current_weather_at(coordinates, Some(name)).await
    }

    pub async fn current_weather_at(
        &self,
        coordinates: Coordinates,
        label: Option<&str>,
    ) -> DateWeatherResult<WeatherSnapshot> {
        let mut query = coordinate_query(&coordinates);
        query.push(("current", CURRENT_FIELDS.to_string()));
        query.push(("timezone", "auto".to_string()));

        let response: CurrentResponse =
            get_json(&self.client, FORECAST_ENDPOINT, &self.forecast_url, &query)
                .await
                .inspect_err(|e| tracing::warn!("Current weather lookup failed: {}", e))?;
        let current = response.current;

        Ok(WeatherSnapshot {
            city: label.unwrap_or(UNKNOWN_LOCATION).to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            temperature: current.temperature_2m,
            feels_like: current.apparent_temperature,
            humidity: current.relative_humidity_2m,
            pressure: current.surface_pressure,
            wind_speed: current.wind_speed_10m,
            wind_direction: current.wind_direction_10m,
            precipitation: current.precipitation,
            weather_code: current.weather_code,
            description: describe_weather_code(current.weather_code).to_string(),
            update_time: current.time,
        })
    }

    pub async fn forecast(&self, name: &str) -> DateWeatherResult<Forecast> {
        let coordinates = self.resolver.resolve(name).await?;
        self.forecast_at(coordinates, Some(name)).await
    }

    pub async fn forecast_at(
        &self,
        coordinates: Coordinates,
        label: Option<&str>,
    ) -> DateWeatherResult<Forecast> {
        let mut query = coordinate_query(&coordinates);
        query.push(("daily", DAILY_FIELDS.to_string()));
        query.push(("timezone", "auto".to_string()));

        let response: DailyResponse =
            get_json(&self.client, FORECAST_ENDPOINT, &self.forecast_url, &query)
                .await
                .inspect_err(|e| tracing::warn!("Forecast lookup failed: {}", e))?;

        Ok(Forecast {
            city: label.unwrap_or(UNKNOWN_LOCATION).to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            forecast: response.daily.into_days()?,
        })
    }

    /// Pollutant readings for today in the server's local calendar
    pub async fn air_quality(&self, coordinates: Coordinates) -> DateWeatherResult<AirQualityReading> {
        let today = today_in(&self.local_timezone)
            .format(DATE_FORMAT)
            .to_string();

        let mut query = coordinate_query(&coordinates);
        query.push(("current", AIR_QUALITY_FIELDS.to_string()));
        query.push(("start_date", today.clone()));
        query.push(("end_date", today));

        let response: AirQualityResponse = get_json(
            &self.client,
            AIR_QUALITY_ENDPOINT,
            &self.air_quality_url,
            &query,
        )
        .await
        .inspect_err(|e| tracing::warn!("Air quality lookup failed: {}", e))?;
        let current = response.current;

        Ok(AirQualityReading {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            pm10: current.pm10,
            pm2_5: current.pm2_5,
            co: current.carbon_monoxide,
            no2: current.nitrogen_dioxide,
            o3: current.ozone,
            update_time: current.time,
            aqi_level: air_quality_level(current.pm2_5),
        })
    }
}

fn coordinate_query(coordinates: &Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", format!("{:.6}", coordinates.latitude)),
        ("longitude", format!("{:.6}", coordinates.longitude)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::AirQualityLevel;
    use chrono::Utc;
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedResolver(Option<Coordinates>);

    #[async_trait]
    impl LocationResolver for FixedResolver {
        async fn resolve(&self, name: &str) -> DateWeatherResult<Coordinates> {
            self.0.ok_or_else(|| DateWeatherError::LocationNotFound {
                name: name.to_string(),
            })
        }
    }

    fn beijing() -> Coordinates {
        Coordinates::new(39.9042, 116.4074).unwrap()
    }

    fn service_for(server: &MockServer, resolved: Option<Coordinates>) -> WeatherService {
        let config = Config {
            forecast_url: format!("{}/v1/forecast", server.uri()),
            air_quality_url: format!("{}/v1/air-quality", server.uri()),
            ..Config::default()
        };
        let client = build_client(&config).unwrap();
        WeatherService::with_resolver(
            client,
            &config,
            Arc::new(FixedResolver(resolved)),
            chrono_tz::Asia::Shanghai,
        )
    }

    fn current_body() -> serde_json::Value {
        json!({
            "latitude": 39.9,
            "longitude": 116.4,
            "current": {
                "time": "2024-05-01T14:15",
                "interval": 900,
                "temperature_2m": 24.3,
                "relative_humidity_2m": 41,
                "apparent_temperature": 23.1,
                "precipitation": 0.0,
                "weather_code": 2,
                "surface_pressure": 1003.4,
                "wind_speed_10m": 11.2,
                "wind_direction_10m": 185
            }
        })
    }

    #[tokio::test]
    async fn test_current_weather_at_normalizes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "39.904200"))
            .and(query_param("longitude", "116.407400"))
            .and(query_param("current", CURRENT_FIELDS))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = service_for(&server, None)
            .current_weather_at(beijing(), None)
            .await
            .unwrap();

        assert_eq!(snapshot.city, UNKNOWN_LOCATION);
        assert_eq!(snapshot.latitude, 39.9042);
        assert_eq!(snapshot.temperature, 24.3);
        assert_eq!(snapshot.feels_like, 23.1);
        assert_eq!(snapshot.humidity, 41.0);
        assert_eq!(snapshot.pressure, 1003.4);
        assert_eq!(snapshot.wind_direction, 185.0);
        assert_eq!(snapshot.weather_code, 2);
        assert_eq!(snapshot.description, "cloudy");
        assert_eq!(snapshot.update_time, "2024-05-01T14:15");
    }

    #[tokio::test]
    async fn test_current_weather_by_name_uses_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let snapshot = service_for(&server, Some(beijing()))
            .current_weather("北京")
            .await
            .unwrap();

        assert_eq!(snapshot.city, "北京");
        assert_eq!(snapshot.longitude, 116.4074);
    }

    #[tokio::test]
    async fn test_unresolved_name_skips_weather_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(0)
            .mount(&server)
            .await;

        let result = service_for(&server, None).current_weather("Atlantis").await;
        assert!(matches!(result, Err(DateWeatherError::LocationNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unexpected_current_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"time": "2024-05-01T14:15", "temperature_2m": 24.3}
            })))
            .mount(&server)
            .await;

        let result = service_for(&server, None)
            .current_weather_at(beijing(), Some("Beijing"))
            .await;
        assert!(matches!(result, Err(DateWeatherError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_forecast_builds_days_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2024-05-01", "2024-05-02", "2024-05-03"],
                    "weather_code": [0, 61, 42],
                    "temperature_2m_max": [25.1, 19.4, 21.0],
                    "temperature_2m_min": [13.2, 12.8, 11.5],
                    "precipitation_sum": [0.0, 8.3, 0.4],
                    "wind_speed_10m_max": [12.0, 20.5, 9.9]
                }
            })))
            .mount(&server)
            .await;

        let forecast = service_for(&server, Some(beijing()))
            .forecast("Beijing")
            .await
            .unwrap();

        assert_eq!(forecast.city, "Beijing");
        assert_eq!(forecast.forecast.len(), 3);

        let dates: Vec<_> = forecast.forecast.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2024-05-01", "2024-05-02", "2024-05-03"]);

        let second = &forecast.forecast[1];
        assert_eq!(second.max_temp, 19.4);
        assert_eq!(second.min_temp, 12.8);
        assert_eq!(second.precipitation, 8.3);
        assert_eq!(second.wind_speed, 20.5);
        assert_eq!(second.description, "rain");
        assert_eq!(forecast.forecast[2].description, "unknown weather");
    }

    #[tokio::test]
    async fn test_forecast_length_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2024-05-01", "2024-05-02"],
                    "weather_code": [0, 61],
                    "temperature_2m_max": [25.1, 19.4],
                    "temperature_2m_min": [13.2],
                    "precipitation_sum": [0.0, 8.3],
                    "wind_speed_10m_max": [12.0, 20.5]
                }
            })))
            .mount(&server)
            .await;

        let err = service_for(&server, None)
            .forecast_at(beijing(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DateWeatherError::Upstream { .. }));
        assert!(err.to_string().contains("temperature_2m_min"));
    }

    #[tokio::test]
    async fn test_forecast_at_default_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": [],
                    "weather_code": [],
                    "temperature_2m_max": [],
                    "temperature_2m_min": [],
                    "precipitation_sum": [],
                    "wind_speed_10m_max": []
                }
            })))
            .mount(&server)
            .await;

        let forecast = service_for(&server, None)
            .forecast_at(beijing(), None)
            .await
            .unwrap();

        assert_eq!(forecast.city, UNKNOWN_LOCATION);
        assert!(forecast.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_air_quality_scoped_to_today() {
        let today = Utc::now()
            .with_timezone(&chrono_tz::Asia::Shanghai)
            .format(DATE_FORMAT)
            .to_string();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/air-quality"))
            .and(query_param("current", AIR_QUALITY_FIELDS))
            .and(query_param("start_date", today.as_str()))
            .and(query_param("end_date", today.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "time": "2024-05-01T14:00",
                    "pm10": 48.2,
                    "pm2_5": 35.01,
                    "carbon_monoxide": 310.0,
                    "nitrogen_dioxide": 22.5,
                    "ozone": 80.0
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reading = service_for(&server, None)
            .air_quality(beijing())
            .await
            .unwrap();

        assert_eq!(reading.pm2_5, 35.01);
        assert_eq!(reading.co, 310.0);
        assert_eq!(reading.no2, 22.5);
        assert_eq!(reading.o3, 80.0);
        assert_eq!(reading.aqi_level, AirQualityLevel::Moderate);
        assert_eq!(reading.update_time, "2024-05-01T14:00");
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_next_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let service = service_for(&server, None);
        assert!(service.current_weather_at(beijing(), None).await.is_err());
        assert!(service.current_weather_at(beijing(), None).await.is_ok());
    }
}
