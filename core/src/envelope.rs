//! The OfficeVibe response envelope and the rule that reconciles it with the
//! HTTP status.
//!
//! Every endpoint answers with `{"isSuccess": bool, "errorMessage": string,
//! "data": ...}`; the sync endpoint reports `errors: [string]` instead of a
//! single message. A call succeeds only when the status is 200 *and* the flag
//! is true. The body is decoded before the status is looked at, so an HTML
//! page served with any status surfaces as `DecodingError`.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::warn;

use crate::error::VibeError;
use crate::http::HttpResponse;

const STATUS_OK: u16 = 200;

/// A decoded response body that carries a success flag.
pub trait Envelope: DeserializeOwned {
    type Data;

    fn is_success(&self) -> bool;

    /// Message reported by the vendor when `is_success` is false.
    fn failure_message(&self) -> String;

    fn into_data(self) -> Self::Data;
}

/// The envelope shared by every endpoint except sync.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope for Response<T>
where
    T: DeserializeOwned + Default,
{
    type Data = T;

    fn is_success(&self) -> bool {
        self.is_success
    }

    fn failure_message(&self) -> String {
        self.error_message.clone().unwrap_or_default()
    }

    fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// Envelope for endpoints that only confirm; any `data` is ignored.
pub type Confirmation = Response<IgnoredAny>;

/// The sync envelope: failures arrive as a list of messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse<T> {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope for SyncResponse<T>
where
    T: DeserializeOwned + Default,
{
    type Data = T;

    fn is_success(&self) -> bool {
        self.is_success
    }

    fn failure_message(&self) -> String {
        self.errors.as_deref().unwrap_or_default().join(", ")
    }

    fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// Decode `response` as `E` and apply the success rule.
pub fn parse<E: Envelope>(response: &HttpResponse) -> Result<E::Data, VibeError> {
    let envelope: E = serde_json::from_str(&response.body).map_err(|e| {
        warn!(status = response.status, error = %e, "vendor response is not a JSON envelope");
        VibeError::DecodingError(e)
    })?;

    if response.status != STATUS_OK || !envelope.is_success() {
        let message = envelope.failure_message();
        warn!(status = response.status, %message, "vendor reported failure");
        return Err(VibeError::ApiError {
            status: response.status,
            message,
        });
    }

    Ok(envelope.into_data())
}
