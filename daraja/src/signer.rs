//! Credential derivation for signed and authenticated requests.
//!
//! Push payments and push queries carry a `Password` computed as
//! `base64(short_code + pass_key + timestamp)` together with the `Timestamp`
//! used to derive it. The OAuth exchange uses HTTP Basic credentials built
//! from the consumer key and secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::timestamp::{Clock, Timestamp};

/// Derives the request password for a push payment or push query.
///
/// Pure and deterministic: identical inputs always produce identical output.
#[must_use]
pub fn password(short_code: &str, pass_key: &str, timestamp: &Timestamp) -> String {
    STANDARD.encode(format!("{short_code}{pass_key}{timestamp}"))
}

/// Builds the `Authorization` header value for the OAuth exchange.
#[must_use]
pub fn basic_auth(consumer_key: &str, consumer_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{consumer_key}:{consumer_secret}"))
    )
}

/// A timestamp and the password derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedCredentials {
    /// Timestamp sent alongside the password.
    pub timestamp: Timestamp,
    /// `base64(short_code + pass_key + timestamp)`.
    pub password: String,
}

impl std::fmt::Debug for SignedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCredentials")
            .field("timestamp", &self.timestamp)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SignedCredentials {
    /// Signs with the current instant of `clock`.
    #[must_use]
    pub fn sign(short_code: &str, pass_key: &str, clock: &dyn Clock) -> Self {
        let timestamp = Timestamp::now(clock);
        Self {
            password: password(short_code, pass_key, &timestamp),
            timestamp,
        }
    }
}
