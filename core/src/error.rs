//! Error types for the OfficeVibe client.
//!
//! # Design
//! The vendor signals failure twice: through the HTTP status and through the
//! `isSuccess` flag of the JSON envelope. Both collapse into `ApiError`.
//! A body that is not JSON at all is almost always the vendor's HTML login
//! page served for a bad API key, so `DecodingError` carries a hint pointing
//! at the key. Network trouble stays in `TransportError`.

use thiserror::Error;

/// Prefix of every `DecodingError` message.
pub const DECODING_ERROR_HINT: &str =
    "could not decode vendor response, verify your credential is configured correctly";

/// Errors returned by `VibeClient` and `Session`.
#[derive(Debug, Error)]
pub enum VibeError {
    /// No response was obtained: connection refused, TLS failure, timeout.
    #[error(transparent)]
    TransportError(#[from] TransportError),

    /// The body was not valid JSON for the expected envelope.
    #[error("{hint}, {0}", hint = DECODING_ERROR_HINT)]
    DecodingError(#[source] serde_json::Error),

    /// The envelope decoded but reported failure, or the status was not 200.
    #[error("vendor error: status: `{status}`, message: `{message}`")]
    ApiError { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl VibeError {
    /// HTTP status reported by the vendor, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            VibeError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A failure below the HTTP layer.
#[derive(Debug, Error)]
#[error("request to {url} failed: {source}")]
pub struct TransportError {
    url: String,
    timed_out: bool,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            url: url.into(),
            timed_out: false,
            source: Box::new(source),
        }
    }

    /// Marks the failure as an expired deadline.
    pub fn timed_out(mut self) -> Self {
        self.timed_out = true;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

/// A specialized Result type for client operations.
pub type VibeResult<T> = Result<T, VibeError>;
