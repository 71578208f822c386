//! Lookup tables turning provider values into readable labels.

use crate::core::models::AirQualityLevel;

/// Description for any weather code missing from [`WEATHER_CODES`]
pub const UNKNOWN_WEATHER: &str = "unknown weather";

/// WMO weather interpretation codes reported by the forecast provider
const WEATHER_CODES: &[(&[i32], &str)] = &[
    (&[0], "clear"),
    (&[1, 2, 3], "cloudy"),
    (&[45, 48], "fog"),
    (&[51, 53, 55], "light rain"),
    (&[56, 57, 66, 67], "freezing rain"),
    (&[61, 63, 65], "rain"),
    (&[71, 73, 75], "snow"),
    (&[77], "snow grains"),
    (&[80, 81, 82], "showers"),
    (&[85, 86], "snow showers"),
    (&[95], "thunderstorm"),
    (&[96, 99], "thunderstorm with hail"),
];

/// Upper PM2.5 bound (inclusive, μg/m³) of each level; anything above the
/// last bound, or NaN, is [`AirQualityLevel::VeryPoor`]
const PM2_5_THRESHOLDS: &[(f64, AirQualityLevel)] = &[
    (12.0, AirQualityLevel::Excellent),
    (35.0, AirQualityLevel::Good),
    (55.0, AirQualityLevel::Moderate),
    (150.0, AirQualityLevel::Poor),
];

pub fn describe_weather_code(code: i32) -> &'static str {
    WEATHER_CODES
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|(_, description)| *description)
        .unwrap_or(UNKNOWN_WEATHER)
}

pub fn air_quality_level(pm2_5: f64) -> AirQualityLevel {
    PM2_5_THRESHOLDS
        .iter()
        .find(|(upper, _)| pm2_5 <= *upper)
        .map(|(_, level)| *level)
        .unwrap_or(AirQualityLevel::VeryPoor)
}
