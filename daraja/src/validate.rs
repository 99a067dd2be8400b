//! Field checks shared by the operation parameter types.
//!
//! Lengths are counted in characters, not bytes.

use url::Url;

use crate::error::DarajaError;

/// Fails if `value` is empty or only whitespace.
pub(crate) fn required(field: &str, value: &str) -> Result<(), DarajaError> {
    if value.trim().is_empty() {
        return Err(DarajaError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Fails if `value` is empty or longer than `max` characters.
pub(crate) fn bounded(field: &str, value: &str, max: usize) -> Result<(), DarajaError> {
    required(field, value)?;
    at_most_chars(field, value, max)
}

/// Fails if a present `value` is longer than `max` characters.
pub(crate) fn optional_bounded(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), DarajaError> {
    value.map_or(Ok(()), |value| at_most_chars(field, value, max))
}

fn at_most_chars(field: &str, value: &str, max: usize) -> Result<(), DarajaError> {
    let len = value.chars().count();
    if len > max {
        return Err(DarajaError::validation(format!(
            "{field} must be at most {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// Fails unless `value` is an absolute `http` or `https` URL.
pub(crate) fn http_url(field: &str, value: &str) -> Result<(), DarajaError> {
    required(field, value)?;
    let url = Url::parse(value.trim())
        .map_err(|e| DarajaError::validation(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DarajaError::validation(format!(
            "{field} must use http or https, got '{scheme}'"
        ))),
    }
}

/// Fails if `value` is zero.
pub(crate) fn positive_amount(field: &str, value: u64) -> Result<(), DarajaError> {
    if value == 0 {
        return Err(DarajaError::validation(format!("{field} must be at least 1")));
    }
    Ok(())
}

/// Fails if `value` is zero or above `max`.
pub(crate) fn amount_within(field: &str, value: u64, max: u64) -> Result<(), DarajaError> {
    positive_amount(field, value)?;
    if value > max {
        return Err(DarajaError::validation(format!(
            "{field} must be at most {max}, got {value}"
        )));
    }
    Ok(())
}
