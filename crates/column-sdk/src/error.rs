//! Error types for Column SDK operations.
//!
//! This module defines the error types used throughout the SDK, with
//! classification for retry logic and enough context for debugging.

use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the Column API on non-2xx responses.
///
/// The API reports failures as `{"code", "message", "type", "param"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    /// Machine readable error code (e.g. `entity_not_found`)
    pub code: String,

    /// Human readable description
    pub message: String,

    /// Error category (e.g. `invalid_request_error`)
    #[serde(rename = "type")]
    pub error_type: String,

    /// Request parameter the error refers to, if any
    #[serde(default)]
    pub param: Option<String>,

    /// Link to the API documentation for this error
    #[serde(default)]
    pub doc_url: Option<String>,
}

/// Errors during Column API operations.
///
/// These errors represent failures when communicating with the Column API,
/// including HTTP errors, rate limiting, and parsing failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Structured error response from the Column API.
    #[error("Column API Error: {} (type: {})", .body.message, .body.code)]
    Api { status: u16, body: ApiErrorBody },

    /// HTTP error response without a parseable error body.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Request to the Column API timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was rejected before being sent.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A list item had no usable cursor id.
    #[error("List item at position {index} has no id to continue pagination from")]
    MissingCursor { index: usize },

    /// Client configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Failed to parse a JSON response.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed if retried.
    ///
    /// Transient conditions include server errors (5xx), rate limiting (429),
    /// timeouts and transport failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout => true,
            Self::InvalidRequest { .. } => false,
            Self::MissingCursor { .. } => false,
            Self::Configuration { .. } => false,
            Self::JsonError(_) => false,
            Self::HttpClientError(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// Check if this error is an HTTP 429 from the API.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// HTTP status carried by this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::HttpError { status, .. } => Some(*status),
            Self::HttpClientError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised while accepting an inbound webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header was not present on the request.
    #[error("Missing {header} header")]
    MissingSignature { header: &'static str },

    /// The signature did not match the payload, or the timestamp was stale.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// The body is not a structurally valid event envelope.
    #[error("Invalid webhook payload: {message}")]
    InvalidPayload { message: String },
}

/// Input validation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was missing or empty.
    #[error("Required field missing: {field}")]
    Required { field: String },

    /// A field had an invalid format.
    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    /// A numeric field was outside its accepted range.
    #[error("{field} out of range: {message}")]
    OutOfRange { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
