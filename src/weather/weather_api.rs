//! Client for WeatherAPI's current conditions endpoint
//! (`GET {base}/v1/current.json?key=..&q=..&aqi=no`).

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::TemperatureLookup;
use crate::config::WeatherConfig;
use crate::error::{ConfigError, TemperatureError};
use crate::models::TemperatureReading;

pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zipcode-weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create weather HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_owned()))
            .ok_or_else(|| ConfigError::new("Weather API key is required"))?;

        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(u64::from(config.timeout_seconds)),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/current.json", self.base_url)
    }

    /// Query string without the key, safe to log
    fn public_query(locality: &str) -> String {
        format!("q={}&aqi=no", urlencoding::encode(locality))
    }
}

#[async_trait]
impl TemperatureLookup for WeatherApiClient {
    #[tracing::instrument(name = "fetch_temperature", level = "debug", skip(self))]
    async fn current_celsius(&self, locality: &str) -> Result<TemperatureReading, TemperatureError> {
        let endpoint = self.endpoint();
        let query = Self::public_query(locality);
        debug!("Querying weather API: {}?key=[REDACTED]&{}", endpoint, query);

        let url = format!(
            "{}?key={}&{}",
            endpoint,
            urlencoding::encode(self.api_key.expose_secret()),
            query
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            // reqwest errors carry the URL, which holds the key
            let e = e.without_url();
            warn!("Weather request failed: {}", e);
            TemperatureError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %body,
                "Weather API returned an error status for {:?}",
                locality
            );
            return Err(TemperatureError::Upstream {
                status: status.as_u16(),
            });
        }

        let current: CurrentWeatherResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            warn!("Failed to decode weather response: {}", e);
            TemperatureError::Decode(e.to_string())
        })?;

        debug!("Current temperature in {:?}: {}°C", locality, current.current.temp_c);
        Ok(TemperatureReading::new(current.current.temp_c))
    }
}

#[derive(Debug, serde::Deserialize)]
struct CurrentWeatherResponse {
    current: CurrentConditions,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}
