//! Error taxonomy and failure classification for Daraja calls.
//!
//! Every adapter call either returns a typed result or fails with exactly one
//! [`DarajaError`] variant:
//!
//! - [`DarajaError::Validation`]: caller input was malformed; nothing was sent
//! - [`DarajaError::Configuration`]: credentials or environment forbid the call; nothing was sent
//! - [`DarajaError::Network`]: the request was sent but no HTTP response came back
//! - [`DarajaError::Api`]: the provider answered with a failure
//!
//! The classification helpers in this module turn raw `reqwest` failures and
//! HTTP responses into that taxonomy.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Code reported for a successful HTTP response whose body could not be decoded.
pub const INVALID_RESPONSE_CODE: &str = "INVALID_RESPONSE";

/// Fallback message when the provider returned neither a description nor a body.
const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Errors that can occur while talking to the Daraja API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DarajaError {
    /// Caller input is malformed. Detected locally, never reaches the network.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description of the offending input.
        message: String,
    },

    /// Missing or forbidden credentials, or an operation not allowed in the
    /// configured environment. Detected locally, never reaches the network.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description of the configuration problem.
        message: String,
    },

    /// The request never produced an HTTP response (timeout, DNS, refused connection).
    #[error("network error: {context}: {source}")]
    Network {
        /// The operation that was being performed, e.g. `"POST stk push"`.
        context: &'static str,
        /// The underlying transport error.
        #[source]
        source: Arc<reqwest::Error>,
    },

    /// An HTTP response was received carrying a provider error.
    #[error("API error {code} (HTTP {status}): {message}")]
    Api {
        /// Provider error code (`errorCode`), or `HTTP_<status>` when absent.
        code: String,
        /// HTTP status of the response.
        status: StatusCode,
        /// Provider description (`errorMessage`), or the raw body.
        message: String,
        /// The raw response body.
        body: String,
    },
}

/// The four error kinds, without payload.
///
/// Useful for callers that only need to decide on remediation: fix input,
/// fix credentials, retry later, or inspect the provider rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`DarajaError::Validation`].
    Validation,
    /// See [`DarajaError::Configuration`].
    Configuration,
    /// See [`DarajaError::Network`].
    Network,
    /// See [`DarajaError::Api`].
    Api,
}

impl ErrorKind {
    /// Returns a stable lowercase identifier for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Network => "network",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DarajaError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a transport failure.
    #[must_use]
    pub fn network(context: &'static str, source: reqwest::Error) -> Self {
        Self::Network {
            context,
            source: Arc::new(source),
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Network { .. } => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    /// Returns `true` if a request left the process before the failure.
    ///
    /// Validation and configuration errors are always raised before any
    /// network attempt.
    #[must_use]
    pub const fn was_sent(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Api { .. })
    }

    /// Returns the provider error code for [`DarajaError::Api`] failures.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the HTTP status for [`DarajaError::Api`] failures.
    #[must_use]
    pub const fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds an [`DarajaError::Api`] error from a non-success response.
    ///
    /// The provider's `errorCode` / `errorMessage` fields are used when the
    /// body is JSON and carries them.
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let fault = ProviderFault::parse(&body);
        let code = fault
            .as_ref()
            .and_then(|f| f.error_code.clone())
            .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
        let message = fault
            .and_then(|f| f.error_message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_owned());
        Self::Api {
            code,
            status,
            message,
            body,
        }
    }
}

/// Error envelope returned by the provider, e.g.
/// `{"requestId":"…","errorCode":"404.001.03","errorMessage":"Invalid Access Token"}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderFault {
    #[serde(default, deserialize_with = "scalar_code")]
    error_code: Option<String>,
    error_message: Option<String>,
}

/// Accepts `errorCode` as a string or a number.
fn scalar_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(code)) => Some(code),
        Some(Value::Number(code)) => Some(code.to_string()),
        _ => None,
    })
}

impl ProviderFault {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Classifies a received HTTP response into a typed result or an API error.
///
/// - non-2xx status → [`DarajaError::Api`]
/// - 2xx carrying an `errorCode` → [`DarajaError::Api`] with that code
/// - 2xx that does not decode into `R` → [`DarajaError::Api`] with
///   [`INVALID_RESPONSE_CODE`]
///
/// # Errors
///
/// Returns [`DarajaError::Api`] as described above.
pub fn classify_response<R>(status: StatusCode, body: String) -> Result<R, DarajaError>
where
    R: DeserializeOwned,
{
    if !status.is_success() {
        return Err(DarajaError::from_status(status, body));
    }
    if let Some(fault) = ProviderFault::parse(&body)
        && let Some(code) = fault.error_code
    {
        let message = fault
            .error_message
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_owned());
        return Err(DarajaError::Api {
            code,
            status,
            message,
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| DarajaError::Api {
        code: INVALID_RESPONSE_CODE.to_owned(),
        status,
        message: format!("failed to decode response: {e}"),
        body,
    })
}
