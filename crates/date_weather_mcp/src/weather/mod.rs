//! Weather, forecast and air-quality lookups against Open-Meteo.
//!
//! ## Modules
//! - `client`: Shared HTTP client and JSON request helper
//! - `codes`: Weather code and PM2.5 lookup tables
//! - `geocoding`: Place name resolution
//! - `service`: Normalization of provider responses

pub mod client;
pub mod codes;
pub mod geocoding;
pub mod service;

pub use service::WeatherService;
