//! Zipcode to temperature pipeline
//!
//! validate -> resolve locality -> fetch temperature -> convert units.
//! Stages run strictly in sequence and the first failure is terminal.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{LocalityError, PipelineError};
use crate::location_resolver::{LocalityLookup, ViaCepClient};
use crate::models::WeatherResponse;
use crate::weather::{TemperatureLookup, WeatherApiClient};
use crate::zipcode::Zipcode;

/// Orchestrates the two upstream lookups for a single request
#[derive(Clone)]
pub struct WeatherService {
    localities: Arc<dyn LocalityLookup>,
    temperatures: Arc<dyn TemperatureLookup>,
}

impl WeatherService {
    pub fn new(
        localities: Arc<dyn LocalityLookup>,
        temperatures: Arc<dyn TemperatureLookup>,
    ) -> Self {
        Self {
            localities,
            temperatures,
        }
    }

    /// Build the service with the HTTP clients described by `config`
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let localities = ViaCepClient::from_config(&config.locality)?;
        let temperatures = WeatherApiClient::from_config(&config.weather)?;
        Ok(Self::new(Arc::new(localities), Arc::new(temperatures)))
    }

    /// Current temperature for a raw, unvalidated zipcode
    #[tracing::instrument(name = "weather_by_zipcode", skip(self))]
    pub async fn weather_by_zipcode(&self, raw: &str) -> Result<WeatherResponse, PipelineError> {
        let zipcode = Zipcode::parse(raw).inspect_err(|e| info!("Rejected zipcode: {}", e))?;

        let record = match self.localities.resolve(&zipcode).await {
            Ok(record) => record,
            Err(LocalityError::Unavailable { status }) => {
                // Reported to the caller as not found, same as the other locality failures
                warn!(
                    "Locality service unavailable (status {}) for zipcode {}",
                    status, zipcode
                );
                return Err(PipelineError::ZipcodeNotFound);
            }
            Err(e) => {
                info!("Could not resolve zipcode {}: {}", zipcode, e);
                return Err(PipelineError::ZipcodeNotFound);
            }
        };

        if !record.has_locality() {
            info!("Zipcode {} resolved without a locality", zipcode);
            return Err(PipelineError::ZipcodeNotFound);
        }

        let reading = self
            .temperatures
            .current_celsius(&record.locality)
            .await
            .inspect_err(|e| {
                error!(
                    "Temperature lookup failed for {:?} (zipcode {}): {}",
                    record.locality, zipcode, e
                )
            })?;

        Ok(WeatherResponse::from(reading))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TemperatureError;
    use crate::models::{LocalityRecord, TemperatureReading};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct StubLocalities {
        result: Result<LocalityRecord, LocalityError>,
        pub(crate) calls: AtomicUsize,
    }

    impl StubLocalities {
        pub(crate) fn returning(result: Result<LocalityRecord, LocalityError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LocalityLookup for StubLocalities {
        async fn resolve(&self, _zipcode: &Zipcode) -> Result<LocalityRecord, LocalityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    pub(crate) struct StubTemperatures {
        result: Result<TemperatureReading, TemperatureError>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_locality: std::sync::Mutex<Option<String>>,
    }

    impl StubTemperatures {
        pub(crate) fn returning(result: Result<TemperatureReading, TemperatureError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                last_locality: std::sync::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl TemperatureLookup for StubTemperatures {
        async fn current_celsius(
            &self,
            locality: &str,
        ) -> Result<TemperatureReading, TemperatureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_locality.lock().unwrap() = Some(locality.to_string());
            self.result.clone()
        }
    }

    fn sao_paulo() -> Result<LocalityRecord, LocalityError> {
        Ok(LocalityRecord::new("12345-678", "São Paulo"))
    }

    #[tokio::test]
    async fn test_end_to_end_conversion() {
        let localities = StubLocalities::returning(sao_paulo());
        let temperatures = StubTemperatures::returning(Ok(TemperatureReading::new(25.0)));
        let service = WeatherService::new(localities.clone(), temperatures.clone());

        let response = service.weather_by_zipcode("12345678").await.unwrap();

        assert_eq!(
            response,
            WeatherResponse {
                celsius: 25.0,
                fahrenheit: 77.0,
                kelvin: 298.0
            }
        );
        assert_eq!(localities.calls.load(Ordering::SeqCst), 1);
        assert_eq!(temperatures.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            temperatures.last_locality.lock().unwrap().as_deref(),
            Some("São Paulo")
        );
    }

    #[rstest]
    #[case("1234567")]
    #[case("1234567a")]
    #[case("")]
    #[tokio::test]
    async fn test_invalid_zipcode_makes_no_outbound_call(#[case] raw: &str) {
        let localities = StubLocalities::returning(sao_paulo());
        let temperatures = StubTemperatures::returning(Ok(TemperatureReading::new(25.0)));
        let service = WeatherService::new(localities.clone(), temperatures.clone());

        let result = service.weather_by_zipcode(raw).await;

        assert!(matches!(result, Err(PipelineError::InvalidZipcode(_))));
        assert_eq!(localities.calls.load(Ordering::SeqCst), 0);
        assert_eq!(temperatures.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case(Err(LocalityError::not_found("12345678")))]
    #[case(Err(LocalityError::Unavailable { status: 503 }))]
    #[case(Err(LocalityError::Decode("expected value".into())))]
    #[case(Err(LocalityError::Transport("connection refused".into())))]
    #[case(Ok(LocalityRecord::new("12345-678", "")))]
    #[tokio::test]
    async fn test_locality_failures_are_not_found(
        #[case] locality: Result<LocalityRecord, LocalityError>,
    ) {
        let temperatures = StubTemperatures::returning(Ok(TemperatureReading::new(25.0)));
        let service =
            WeatherService::new(StubLocalities::returning(locality), temperatures.clone());

        let result = service.weather_by_zipcode("12345678").await;

        assert_eq!(result, Err(PipelineError::ZipcodeNotFound));
        assert_eq!(temperatures.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case(TemperatureError::Upstream { status: 400 })]
    #[case(TemperatureError::Upstream { status: 503 })]
    #[case(TemperatureError::Decode("missing field `temp_c`".into()))]
    #[case(TemperatureError::Transport("timed out".into()))]
    #[tokio::test]
    async fn test_weather_failures_are_internal(#[case] failure: TemperatureError) {
        let service = WeatherService::new(
            StubLocalities::returning(sao_paulo()),
            StubTemperatures::returning(Err(failure.clone())),
        );

        let result = service.weather_by_zipcode("12345-678").await;

        assert_eq!(result, Err(PipelineError::Internal(failure)));
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let localities = StubLocalities::returning(sao_paulo());
        let temperatures = StubTemperatures::returning(Ok(TemperatureReading::new(18.4)));
        let service = WeatherService::new(localities.clone(), temperatures.clone());

        let first = service.weather_by_zipcode("12345678").await.unwrap();
        let second = service.weather_by_zipcode("12345678").await.unwrap();

        assert_eq!(first, second);
        // no caching: every request reaches both upstreams
        assert_eq!(localities.calls.load(Ordering::SeqCst), 2);
        assert_eq!(temperatures.calls.load(Ordering::SeqCst), 2);
    }
}
