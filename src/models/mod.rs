//! Data models for the zipcode weather service
//!
//! - Locality: result of the zipcode lookup
//! - Weather: temperature reading and the converted response payload

pub mod locality;
pub mod weather;

// Re-export all public types for convenient access
pub use locality::LocalityRecord;
pub use weather::{TemperatureReading, WeatherResponse, celsius_to_fahrenheit, celsius_to_kelvin};
