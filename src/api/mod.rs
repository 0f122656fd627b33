use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{error::PipelineError, models::WeatherResponse, service::WeatherService};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather/{zipcode}", get(get_weather))
        .with_state(service)
}

/// HTTP status for each pipeline outcome
pub fn status_code(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidZipcode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::ZipcodeNotFound => StatusCode::NOT_FOUND,
        PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let body = ApiError {
            error: self.user_message().to_string(),
        };
        (status_code(&self), Json(body)).into_response()
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

#[tracing::instrument(name = "get_weather", skip(service))]
async fn get_weather(
    State(service): State<WeatherService>,
    Path(zipcode): Path<String>,
) -> Result<Json<WeatherResponse>, PipelineError> {
    let weather = service.weather_by_zipcode(&zipcode).await?;
    Ok(Json(weather))
}
