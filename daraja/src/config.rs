//! Adapter configuration.
//!
//! A [`ClientConfig`] is created once and handed to
//! [`DarajaClient`](crate::client::DarajaClient), which owns it for its whole
//! lifetime. Two adapters with different configurations (for example a
//! sandbox and a production one) can coexist in the same process.
//!
//! # Environment Variables
//!
//! [`ClientConfig::from_env`] reads:
//!
//! - `DARAJA_CONSUMER_KEY` / `DARAJA_CONSUMER_SECRET`: OAuth app credentials
//! - `DARAJA_BUSINESS_SHORT_CODE`: paybill or till short code
//! - `DARAJA_PASS_KEY`: pass key for signed push payments
//! - `DARAJA_ENVIRONMENT`: `sandbox` (default) or `production`
//! - `DARAJA_INITIATOR_NAME` / `DARAJA_INITIATOR_PASSWORD`: initiator for privileged operations
//! - `DARAJA_SECURITY_CREDENTIAL`: pre-encrypted initiator credential (optional)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DarajaError;

/// Provider environment. Selects the API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// `https://sandbox.safaricom.co.ke`
    #[default]
    Sandbox,
    /// `https://api.safaricom.co.ke`
    Production,
}

impl Environment {
    /// Returns the lowercase name of the environment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = DarajaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(DarajaError::configuration(format!(
                "unknown environment '{other}', expected 'sandbox' or 'production'"
            ))),
        }
    }
}

/// Initiator credentials required by B2C, B2B, balance, status and reversal calls.
#[derive(Clone, PartialEq, Eq)]
pub struct InitiatorCredentials {
    /// Initiator user name registered on the provider portal.
    pub name: String,
    /// Initiator password.
    pub password: String,
    /// Pre-encrypted security credential. Sent instead of `password` when set.
    pub security_credential: Option<String>,
}

impl InitiatorCredentials {
    /// Creates initiator credentials without a pre-encrypted credential.
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            security_credential: None,
        }
    }

    /// Returns the value sent as `SecurityCredential`.
    #[must_use]
    pub fn security_credential(&self) -> &str {
        self.security_credential.as_deref().unwrap_or(&self.password)
    }
}

impl fmt::Debug for InitiatorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitiatorCredentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field(
                "security_credential",
                &self.security_credential.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Immutable configuration for one adapter instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// OAuth consumer key.
    pub consumer_key: String,
    /// OAuth consumer secret.
    pub consumer_secret: String,
    /// Business short code (paybill or till).
    pub business_short_code: String,
    /// Pass key used to sign push payments.
    pub pass_key: String,
    /// Target environment.
    pub environment: Environment,
    /// Initiator credentials for privileged operations.
    pub initiator: Option<InitiatorCredentials>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("business_short_code", &self.business_short_code)
            .field("pass_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("initiator", &self.initiator)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration without initiator credentials.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        business_short_code: impl Into<String>,
        pass_key: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            business_short_code: business_short_code.into(),
            pass_key: pass_key.into(),
            environment,
            initiator: None,
        }
    }

    /// Installs initiator credentials.
    #[must_use]
    pub fn with_initiator(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.initiator = Some(InitiatorCredentials::new(name, password));
        self
    }

    /// Sets the pre-encrypted security credential on the installed initiator.
    ///
    /// Has no effect when no initiator is configured.
    #[must_use]
    pub fn with_security_credential(mut self, credential: impl Into<String>) -> Self {
        if let Some(initiator) = self.initiator.as_mut() {
            initiator.security_credential = Some(credential.into());
        }
        self
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] if a required variable is
    /// missing or `DARAJA_ENVIRONMENT` has an unknown value.
    pub fn from_env() -> Result<Self, DarajaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] if a required variable is
    /// missing or `DARAJA_ENVIRONMENT` has an unknown value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DarajaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| {
            get(key).ok_or_else(|| DarajaError::configuration(format!("{key} is not set")))
        };

        let environment = match get("DARAJA_ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };
        let mut config = Self::new(
            require("DARAJA_CONSUMER_KEY")?,
            require("DARAJA_CONSUMER_SECRET")?,
            require("DARAJA_BUSINESS_SHORT_CODE")?,
            require("DARAJA_PASS_KEY")?,
            environment,
        );
        if let (Some(name), Some(password)) =
            (get("DARAJA_INITIATOR_NAME"), get("DARAJA_INITIATOR_PASSWORD"))
        {
            config = config.with_initiator(name, password);
            if let Some(credential) = get("DARAJA_SECURITY_CREDENTIAL") {
                config = config.with_security_credential(credential);
            }
        }
        Ok(config)
    }
}
