//! Clock abstraction and the provider's `YYYYMMDDHHMMSS` timestamp.
//!
//! Signed requests carry a [`Timestamp`] rendered in East Africa Time
//! (UTC+03:00, no daylight saving), which is the provider's local time. The
//! same instant is used for both the `Timestamp` field and the password
//! derivation so the two always agree.
//!
//! All time reads go through a [`Clock`] so token expiry and signatures can be
//! tested against a fixed instant.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Serialize, Serializer};

/// Offset of East Africa Time from UTC, in seconds.
const EAT_OFFSET_SECS: i32 = 3 * 60 * 60;

/// Format string for [`Timestamp`].
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of the current instant.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`Clock`] that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A provider timestamp, formatted as `YYYYMMDDHHMMSS` in East Africa Time.
///
/// Serialized as a plain string:
///
/// ```json
/// "20240115143000"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Converts an instant to the provider's local time.
    #[must_use]
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        let eat = FixedOffset::east_opt(EAT_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Self(instant.with_timezone(&eat))
    }

    /// Reads the current instant from `clock`.
    #[must_use]
    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_utc(clock.now())
    }

    /// Returns the underlying instant with its offset.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
