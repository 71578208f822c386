//! # Date & Weather MCP Server Core
//!
//! Date/time computation that needs no network access.
//!
//! ## Features
//! - Current time in the local timezone, UTC or any IANA timezone
//! - Epoch timestamp conversion
//! - Interval computation and calendar arithmetic
//! - Custom formatting and calendar queries
//!
//! ## Modules
//! - `error`: Failure kinds shared with the weather lookups
//! - `models`: Result records returned to callers
//! - `requests`: Tool parameters and their validation
//! - `temporal`: The date/time engine
//! - `utils`: Fixed pattern parsing and custom pattern rendering

pub mod error;
pub mod models;
pub mod requests;
pub mod temporal;
pub mod utils;
