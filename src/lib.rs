//! `zipcode-weather` - current temperature lookup by Brazilian zipcode
//!
//! A zipcode is validated, resolved to a locality through the ViaCEP lookup
//! service, and the locality's current temperature is fetched from
//! WeatherAPI and returned in Celsius, Fahrenheit and Kelvin.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod service;
pub mod telemetry;
pub mod weather;
pub mod web;
pub mod zipcode;

// Re-export core types for public API
pub use config::ServiceConfig;
pub use error::{ConfigError, LocalityError, PipelineError, TemperatureError, ZipcodeError};
pub use location_resolver::{LocalityLookup, ViaCepClient};
pub use models::{LocalityRecord, TemperatureReading, WeatherResponse};
pub use service::WeatherService;
pub use weather::{TemperatureLookup, WeatherApiClient};
pub use zipcode::{Zipcode, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
