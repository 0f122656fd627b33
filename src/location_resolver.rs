//! Locality Resolution Module
//!
//! Resolves a validated zipcode into a locality name through the ViaCEP
//! lookup service (`GET {base}/ws/{zipcode}/json/`).

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::LocalityConfig;
use crate::error::LocalityError;
use crate::models::LocalityRecord;
use crate::zipcode::Zipcode;

/// Zipcode to locality lookup
#[async_trait]
pub trait LocalityLookup: Send + Sync {
    /// Resolve `zipcode` to a record with a non-empty `postal_code`.
    ///
    /// The returned record may still carry an empty locality; deciding what
    /// that means is left to the caller.
    async fn resolve(&self, zipcode: &Zipcode) -> Result<LocalityRecord, LocalityError>;
}

/// HTTP client for the ViaCEP lookup service
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zipcode-weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create locality HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &LocalityConfig) -> anyhow::Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(u64::from(config.timeout_seconds)),
        )
    }

    fn lookup_url(&self, zipcode: &Zipcode) -> String {
        format!("{}/ws/{}/json/", self.base_url, zipcode)
    }
}

#[async_trait]
impl LocalityLookup for ViaCepClient {
    #[tracing::instrument(name = "resolve_locality", level = "debug", skip(self, zipcode), fields(zipcode = %zipcode))]
    async fn resolve(&self, zipcode: &Zipcode) -> Result<LocalityRecord, LocalityError> {
        let url = self.lookup_url(zipcode);
        debug!("Querying locality service: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Locality request failed: {}", e);
            LocalityError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                status = status.as_u16(),
                body = %body,
                "Locality service returned an error status"
            );
            return Err(classify_status(status, zipcode));
        }

        let record: LocalityRecord = response.json().await.map_err(|e| {
            warn!("Failed to decode locality response: {}", e);
            LocalityError::Decode(e.to_string())
        })?;

        if !record.is_found() {
            debug!("Locality service has no record for {}", zipcode);
            return Err(LocalityError::not_found(zipcode.as_str()));
        }

        debug!("Resolved {} to locality {:?}", zipcode, record.locality);
        Ok(record)
    }
}

fn classify_status(status: StatusCode, zipcode: &Zipcode) -> LocalityError {
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => LocalityError::Unavailable {
            status: status.as_u16(),
        },
        _ => LocalityError::not_found(zipcode.as_str()),
    }
}
