//! Error types for the zipcode weather pipeline
//!
//! Each stage has its own error enum so the orchestrator can decide which
//! caller-visible outcome a failure maps to without inspecting message text.

use thiserror::Error;

/// Raised when a raw zipcode does not normalize to exactly 8 digits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid zipcode format: {raw:?}")]
pub struct ZipcodeError {
    pub raw: String,
}

impl ZipcodeError {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self { raw: raw.into() }
    }
}

/// Failures of the postal-code to locality lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalityError {
    /// Upstream answered, but has no record for the zipcode
    #[error("zipcode {zipcode} not found")]
    NotFound { zipcode: String },

    /// Upstream answered with a gateway or service-unavailable status
    #[error("locality service temporarily unavailable (status {status})")]
    Unavailable { status: u16 },

    #[error("failed to decode locality response: {0}")]
    Decode(String),

    /// Connection failure, timeout or any other transport-level problem
    #[error("locality request failed: {0}")]
    Transport(String),
}

impl LocalityError {
    pub fn not_found<S: Into<String>>(zipcode: S) -> Self {
        Self::NotFound {
            zipcode: zipcode.into(),
        }
    }
}

/// Failures of the locality to temperature lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemperatureError {
    #[error("weather API error: {status}")]
    Upstream { status: u16 },

    #[error("failed to decode weather response: {0}")]
    Decode(String),

    #[error("weather request failed: {0}")]
    Transport(String),
}

/// Terminal failure states of the pipeline, one per caller-visible outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid zipcode")]
    InvalidZipcode(#[from] ZipcodeError),

    #[error("can not find zipcode")]
    ZipcodeNotFound,

    /// The weather stage failed for a resolvable zipcode. The source is kept
    /// for logging and never rendered to the caller.
    #[error("internal server error")]
    Internal(#[from] TemperatureError),
}

impl PipelineError {
    /// Message shown to the caller. Internal details are never included.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidZipcode(_) => "invalid zipcode",
            PipelineError::ZipcodeNotFound => "can not find zipcode",
            PipelineError::Internal(_) => "internal server error",
        }
    }
}

/// Invalid or missing configuration detected at startup
#[derive(Error, Debug)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
