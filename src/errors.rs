// ABOUTME: Unified error type for the recipe draft pipeline with stable error codes
// ABOUTME: Separates transport, decode, storage, enrichment and configuration failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the crate returns [`AppResult`]. Callers tell
//! failure kinds apart through [`AppError::code`] instead of matching on message
//! text, and the retry loop asks [`AppError::is_retryable`] whether another
//! attempt is worthwhile.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    /// Caller supplied an unusable argument
    InvalidInput,

    // Resource management
    /// Draft does not exist or has expired
    ResourceNotFound,
    /// Draft store backend could not complete the operation
    StoreUnavailable,

    // External services
    /// Upstream service returned an error status or malformed envelope
    ExternalServiceError,
    /// Upstream service could not be reached
    ExternalServiceUnavailable,
    /// Upstream service rate limited the request
    ExternalRateLimited,
    /// Upstream call exceeded its deadline
    ExternalTimeout,

    // Generation pipeline
    /// Model text could not be decoded into a recipe
    DecodeFailed,
    /// Every generation attempt failed
    GenerationFailed,
    /// Embedding or image enrichment failed
    EnrichmentFailed,
    /// Caller abandoned the request
    Cancelled,

    // Configuration
    /// Required configuration is missing
    ConfigMissing,
    /// Configuration is invalid
    ConfigInvalid,

    // Internal
    /// Unexpected internal failure
    InternalError,
    /// Serialization or deserialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get the HTTP status code an outer surface should map this error to
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::ResourceNotFound => 404,
            Self::Cancelled => 499,
            Self::ExternalServiceError | Self::DecodeFailed | Self::GenerationFailed => 502,
            Self::StoreUnavailable
            | Self::ExternalServiceUnavailable
            | Self::ExternalRateLimited => 503,
            Self::ExternalTimeout => 504,
            Self::EnrichmentFailed
            | Self::ConfigMissing
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::StoreUnavailable => "The draft store is unavailable",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ExternalTimeout => "An external service did not respond in time",
            Self::DecodeFailed => "The generated response could not be decoded",
            Self::GenerationFailed => "Recipe generation failed",
            Self::EnrichmentFailed => "Recipe enrichment failed",
            Self::Cancelled => "The request was cancelled",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether a failure with this code is worth another generation attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExternalServiceError
                | Self::ExternalServiceUnavailable
                | Self::ExternalRateLimited
                | Self::ExternalTimeout
                | Self::DecodeFailed
        )
    }
}

/// Unified error type for the crate
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Identifier of the resource involved, if any
    pub resource_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource_id: None,
            source: None,
        }
    }

    /// Attach the identifier of the resource involved
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether the generation retry loop should try again after this error
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Draft store failure
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service could not be reached
    pub fn external_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Upstream call exceeded its deadline
    pub fn timeout(service: impl Into<String>, seconds: u64) -> Self {
        Self::new(
            ErrorCode::ExternalTimeout,
            format!("{}: no response within {seconds}s", service.into()),
        )
    }

    /// Model output could not be decoded
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeFailed, message)
    }

    /// Every generation attempt failed
    pub fn generation_failed(attempts: u32, last_error: &Self) -> Self {
        Self::new(
            ErrorCode::GenerationFailed,
            format!("generation failed after {attempts} attempts: {last_error}"),
        )
    }

    /// Embedding or image enrichment failed
    pub fn enrichment_failed(capability: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::EnrichmentFailed,
            format!("{capability}: {}", message.into()),
        )
    }

    /// Caller abandoned the request
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cancelled, message)
    }

    /// Configuration value is missing
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// Configuration value is invalid
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::internal(format!("{error} (caused by: {source})")),
            None => Self::internal(error.to_string()),
        }
    }
}
