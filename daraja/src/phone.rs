//! Subscriber number normalization.
//!
//! Accepts the three local shapes of a Kenyan mobile number and rewrites them
//! to the canonical `254[17]XXXXXXXX` form the provider expects:
//!
//! | Input            | Output         |
//! |------------------|----------------|
//! | `0708374149`     | `254708374149` |
//! | `+254708374149`  | `254708374149` |
//! | `254708374149`   | `254708374149` |
//!
//! Spaces, dashes and other separators are stripped before matching.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::DarajaError;

/// Local prefix followed by a nine-digit subscriber number starting with `1` or `7`.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0|\+254|254)([17]\d{8})$").expect("phone pattern is a valid regex")
});

/// A mobile number in canonical `254[17]XXXXXXXX` form.
///
/// Only obtainable through [`normalize`] (or [`NormalizedPhone::from_str`](std::str::FromStr)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Returns the canonical twelve-digit number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NormalizedPhone {
    type Err = DarajaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Canonicalizes a raw mobile number.
///
/// # Errors
///
/// Returns [`DarajaError::Validation`] if the number, after stripping every
/// character that is neither a digit nor `+`, is not one of `0[17]XXXXXXXX`,
/// `+254[17]XXXXXXXX` or `254[17]XXXXXXXX`.
pub fn normalize(raw: &str) -> Result<NormalizedPhone, DarajaError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    PHONE_PATTERN
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|subscriber| NormalizedPhone(format!("254{}", subscriber.as_str())))
        .ok_or_else(|| {
            DarajaError::validation(format!(
                "invalid phone number '{raw}', expected 07XXXXXXXX, 01XXXXXXXX, +2547XXXXXXXX or 2547XXXXXXXX"
            ))
        })
}
