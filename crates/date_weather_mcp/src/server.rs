use rmcp::{
    RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::config::Config;
use crate::core::{
    error::{DateWeatherError, DateWeatherResult, McpResult},
    requests::{
        AddTimeRequest, CityRequest, CoordinatesRequest, DateTimeRequest,
        ForecastByCoordinatesRequest, FormatDateTimeRequest, LeapYearRequest, TimeDifferenceRequest,
        TimeInZoneRequest, TimestampRequest, Validate,
    },
    temporal::TemporalEngine,
    utils::DEFAULT_PATTERN,
};
use crate::weather::WeatherService;

const TOOL_COUNT: usize = 21;

fn json_result<T: Serialize>(value: &T) -> McpResult<CallToolResult> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        rmcp::ErrorData::internal_error(format!("Failed to serialize result: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn text_result(value: impl ToString) -> McpResult<CallToolResult> {
    Ok(CallToolResult::success(vec![Content::text(value.to_string())]))
}

/// Date & Weather MCP Server exposing the temporal engine and weather lookups as tools
#[derive(Clone)]
pub struct DateWeatherService {
    engine: TemporalEngine,
    weather: WeatherService,
    local_timezone_name: String,
    config: Config,
    tool_router: ToolRouter<DateWeatherService>,
}

impl DateWeatherService {
    pub fn new(config: &Config) -> DateWeatherResult<Self> {
        let engine = match config.local_timezone.as_deref() {
            Some(name) => {
                let timezone =
                    name.trim()
                        .parse::<chrono_tz::Tz>()
                        .map_err(|_| DateWeatherError::InvalidTimezone {
                            timezone: name.to_string(),
                        })?;
                TemporalEngine::with_timezone(timezone)
            }
            None => TemporalEngine::new(),
        };
        let weather = WeatherService::new(config, engine.local_timezone())?;
        let local_timezone_name = engine.local_timezone().name().to_string();

        Ok(Self {
            engine,
            weather,
            local_timezone_name,
            config: config.clone(),
            tool_router: Self::tool_router(),
        })
    }

    fn create_resource_text(&self, uri: &str, name: &str) -> Resource {
        RawResource::new(uri, name.to_string()).no_annotation()
    }

    pub(crate) fn get_local_timezone_name(&self) -> &str {
        &self.local_timezone_name
    }

    fn generate_status_content(&self) -> String {
        let info = self.engine.full_info();

        format!(
            r#"Date & Weather MCP Server Status

Server: Running
Local Timezone: {}
Current Local Time: {}
Current UTC Time: {}
Day of Week: {}
Geocoding Endpoint: {}
Forecast Endpoint: {}
Air Quality Endpoint: {}
Request Timeout: {}s
Tools Available: {}
Resources Available: 2

Capabilities:
- Current time in the local timezone, UTC or any IANA timezone
- Epoch timestamp conversion
- Time differences and calendar arithmetic
- Custom date formatting and calendar queries
- Current weather, 7-day forecasts and air quality by city or coordinates"#,
            info.timezone,
            info.current_time,
            info.current_utc_time,
            info.day_of_week,
            self.config.geocoding_url,
            self.config.forecast_url,
            self.config.air_quality_url,
            self.config.timeout.as_secs(),
            TOOL_COUNT
        )
    }

    fn generate_help_content(&self) -> String {
        format!(
            r#"Date & Weather MCP Server Help

TIME FORMAT:
All time parameters and results use {pattern}, e.g. 2023-12-21 10:30:00.
Local times are interpreted in {tz}.

DATE & TIME TOOLS:
- get_current_time: Current local time
- get_current_utc_time: Current UTC time
- get_time_in_zone: Current time in a timezone
  - Example: {{"zone_id": "America/New_York"}}
- get_current_timestamp / get_current_timestamp_seconds: Epoch milliseconds / seconds
- timestamp_to_datetime: Epoch milliseconds to local time
  - Example: {{"timestamp": 1703123456789}}
- datetime_to_timestamp: Local time to epoch milliseconds
  - Example: {{"date_time": "2023-12-21 10:30:00"}}
- calculate_time_difference: Interval between two times (end - start)
  - Example: {{"start_time": "2023-12-21 10:00:00", "end_time": "2023-12-21 15:30:00"}}
- add_time: Add (or subtract) years, months, days, hours, minutes or seconds
  - Example: {{"date_time": "2023-12-21 10:00:00", "amount": -3, "unit": "hours"}}
  - Month and year steps clamp to the end of the month (Jan 31 + 1 month = Feb 28/29)
- format_datetime: Render a time with a custom pattern
  - Example: {{"date_time": "2023-12-21 10:30:00", "pattern": "yyyy年MM月dd日"}}
- get_day_of_week, get_current_year, get_current_month, get_current_day
- is_leap_year: Example: {{"year": 2024}}
- get_full_time_info: All of the above from a single clock reading

WEATHER TOOLS:
- get_current_weather: Current conditions by city name
  - Example: {{"city_name": "Beijing"}}
- get_weather_by_coordinates: Current conditions by coordinates
  - Example: {{"lat": 39.9042, "lon": 116.4074}}
- get_weather_forecast: 7-day forecast by city name
- get_forecast_by_coordinates: 7-day forecast by coordinates, optional city_name label
- get_air_quality: PM10, PM2.5, CO, NO2, O3 and a PM2.5-based level
  - Example: {{"lat": 39.9042, "lon": 116.4074}}

AIR QUALITY LEVELS (PM2.5, μg/m³):
- <= 12 excellent, <= 35 good, <= 55 moderate, <= 150 poor, above: very poor

RESOURCES:
- datetime://status: Current server status and local time
- datetime://help: This help documentation"#,
            pattern = DEFAULT_PATTERN,
            tz = self.local_timezone_name
        )
    }
}

#[tool_router]
impl DateWeatherService {
    #[tool(description = "Get the current local time, formatted as yyyy-MM-dd HH:mm:ss")]
    pub(crate) async fn get_current_time(&self) -> McpResult<CallToolResult> {
        json_result(&self.engine.now_local())
    }

    #[tool(description = "Get the current UTC time, formatted as yyyy-MM-dd HH:mm:ss")]
    pub(crate) async fn get_current_utc_time(&self) -> McpResult<CallToolResult> {
        json_result(&self.engine.now_utc())
    }

    #[tool(description = "Get the current time in the given timezone")]
    pub(crate) async fn get_time_in_zone(
        &self,
        Parameters(req): Parameters<TimeInZoneRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        json_result(&self.engine.now_in_zone(&req.zone_id)?)
    }

    #[tool(description = "Get the current epoch timestamp in milliseconds")]
    pub(crate) async fn get_current_timestamp(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.now_epoch_millis())
    }

    #[tool(description = "Get the current epoch timestamp in seconds")]
    pub(crate) async fn get_current_timestamp_seconds(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.now_epoch_seconds())
    }

    #[tool(description = "Convert an epoch timestamp in milliseconds to readable local time")]
    pub(crate) async fn timestamp_to_datetime(
        &self,
        Parameters(req): Parameters<TimestampRequest>,
    ) -> McpResult<CallToolResult> {
        json_result(&self.engine.epoch_millis_to_time(req.timestamp)?)
    }

    #[tool(description = "Convert a local time (yyyy-MM-dd HH:mm:ss) to an epoch timestamp in milliseconds")]
    pub(crate) async fn datetime_to_timestamp(
        &self,
        Parameters(req): Parameters<DateTimeRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        text_result(self.engine.time_to_epoch_millis(&req.date_time)?)
    }

    #[tool(description = "Calculate the difference between two times, with totals and a days/hours/minutes/seconds breakdown")]
    pub(crate) async fn calculate_time_difference(
        &self,
        Parameters(req): Parameters<TimeDifferenceRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        json_result(&self.engine.difference(&req.start_time, &req.end_time)?)
    }

    #[tool(description = "Add an amount of time units (years/months/days/hours/minutes/seconds) to a time; negative amounts subtract")]
    pub(crate) async fn add_time(
        &self,
        Parameters(req): Parameters<AddTimeRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        json_result(&self.engine.add(&req.date_time, req.amount, &req.unit)?)
    }

    #[tool(description = "Format a time using a custom pattern")]
    pub(crate) async fn format_datetime(
        &self,
        Parameters(req): Parameters<FormatDateTimeRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        text_result(self.engine.format(&req.date_time, &req.pattern)?)
    }

    #[tool(description = "Get today's day of the week")]
    pub(crate) async fn get_day_of_week(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.weekday_name())
    }

    #[tool(description = "Get the current year")]
    pub(crate) async fn get_current_year(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.current_year())
    }

    #[tool(description = "Get the current month (1-12)")]
    pub(crate) async fn get_current_month(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.current_month())
    }

    #[tool(description = "Get the current day of the month")]
    pub(crate) async fn get_current_day(&self) -> McpResult<CallToolResult> {
        text_result(self.engine.current_day())
    }

    #[tool(description = "Check whether a year is a leap year")]
    pub(crate) async fn is_leap_year(
        &self,
        Parameters(req): Parameters<LeapYearRequest>,
    ) -> McpResult<CallToolResult> {
        text_result(self.engine.is_leap_year(req.year))
    }

    #[tool(description = "Get complete current time information: local and UTC time, weekday, timestamps, date parts and leap year flag")]
    pub(crate) async fn get_full_time_info(&self) -> McpResult<CallToolResult> {
        json_result(&self.engine.full_info())
    }

    #[tool(description = "Get current weather for a city: temperature, humidity, wind and more")]
    pub(crate) async fn get_current_weather(
        &self,
        Parameters(req): Parameters<CityRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        json_result(&self.weather.current_weather(&req.city_name).await?)
    }

    #[tool(description = "Get current weather by latitude and longitude")]
    pub(crate) async fn get_weather_by_coordinates(
        &self,
        Parameters(req): Parameters<CoordinatesRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        let coordinates = req.coordinates()?;
        json_result(&self.weather.current_weather_at(coordinates, None).await?)
    }

    #[tool(description = "Get the 7-day weather forecast for a city")]
    pub(crate) async fn get_weather_forecast(
        &self,
        Parameters(req): Parameters<CityRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        json_result(&self.weather.forecast(&req.city_name).await?)
    }

    #[tool(description = "Get the 7-day weather forecast by latitude and longitude")]
    pub(crate) async fn get_forecast_by_coordinates(
        &self,
        Parameters(req): Parameters<ForecastByCoordinatesRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        let coordinates = req.coordinates()?;
        json_result(
            &self
                .weather
                .forecast_at(coordinates, req.city_name.as_deref())
                .await?,
        )
    }

    #[tool(description = "Get air quality by latitude and longitude, including PM2.5 and PM10 concentrations")]
    pub(crate) async fn get_air_quality(
        &self,
        Parameters(req): Parameters<CoordinatesRequest>,
    ) -> McpResult<CallToolResult> {
        req.validate()?;
        let coordinates = req.coordinates()?;
        json_result(&self.weather.air_quality(coordinates).await?)
    }
}

#[tool_handler]
impl ServerHandler for DateWeatherService {
    fn get_info(&self) -> ServerInfo {
        let local_tz = self.get_local_timezone_name();
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Date & Weather MCP Server. Date/time tools use the format {} and local timezone {}. Weather tools accept a city name or latitude/longitude and return current conditions, 7-day forecasts or air quality.",
                DEFAULT_PATTERN, local_tz
            )),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult {
            resources: vec![
                self.create_resource_text("datetime://status", "server-status"),
                self.create_resource_text("datetime://help", "help-documentation"),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> McpResult<ReadResourceResult> {
        match uri.as_str() {
            "datetime://status" => {
                let status = self.generate_status_content();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(status, uri)],
                })
            }
            "datetime://help" => {
                let help = self.generate_help_content();
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(help, uri)],
                })
            }
            _ => Err(DateWeatherError::ResourceNotFound {
                uri: uri.to_string(),
            }
            .into()),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<InitializeResult> {
        tracing::info!("Date & Weather MCP Server initialized successfully");
        Ok(self.get_info())
    }
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    use rmcp::{ServiceExt, transport::stdio};

    let service = DateWeatherService::new(&config)?;
    tracing::info!(
        "Serving with local timezone {}",
        service.get_local_timezone_name()
    );

    let service = service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
