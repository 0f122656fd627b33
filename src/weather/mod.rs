//! Weather lookup: locality name to current Celsius temperature

use async_trait::async_trait;

use crate::error::TemperatureError;
use crate::models::TemperatureReading;

pub mod weather_api;

pub use weather_api::WeatherApiClient;

/// Locality to current temperature lookup
#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn current_celsius(&self, locality: &str) -> Result<TemperatureReading, TemperatureError>;
}
