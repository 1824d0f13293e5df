//! Temporal data types and time handling

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Naive (UTC) layouts accepted by [`Timestamp::from_str`], tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Timestamp representing a UTC point in time with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    /// Nanoseconds since Unix epoch
    nanos: i64,
}

impl Timestamp {
    /// Create a timestamp from nanoseconds since Unix epoch
    pub fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// Create a timestamp from milliseconds since Unix epoch, saturating
    /// outside the representable range
    pub fn from_millis(millis: i64) -> Self {
        Self {
            nanos: millis.saturating_mul(1_000_000),
        }
    }

    /// Create a timestamp from seconds since Unix epoch, saturating outside
    /// the representable range. Use [`Timestamp::try_from_secs`] for
    /// untrusted input.
    pub fn from_secs(secs: i64) -> Self {
        Self {
            nanos: secs.saturating_mul(NANOS_PER_SEC),
        }
    }

    /// Create a timestamp from seconds since Unix epoch, failing when the
    /// value does not fit (roughly years 1677 to 2262)
    pub fn try_from_secs(secs: i64) -> Result<Self> {
        secs.checked_mul(NANOS_PER_SEC)
            .map(Self::from_nanos)
            .ok_or_else(|| Error::Temporal(format!("{} seconds is out of timestamp range", secs)))
    }

    /// Create a timestamp from fractional seconds since Unix epoch, as stored
    /// in the annotation databases
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * NANOS_PER_SEC as f64).round() as i64,
        }
    }

    /// Get current timestamp
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Get nanoseconds since Unix epoch
    pub fn as_nanos(&self) -> i64 {
        self.nanos
    }

    /// Get whole seconds since Unix epoch (floored)
    pub fn as_secs(&self) -> i64 {
        self.nanos.div_euclid(NANOS_PER_SEC)
    }

    /// Get fractional seconds since Unix epoch
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    /// Convert to chrono DateTime
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let subsec = self.nanos.rem_euclid(NANOS_PER_SEC) as u32;
        DateTime::from_timestamp(self.as_secs(), subsec).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// ISO-8601 text without offset, millisecond precision
    /// (`2013-02-01T00:07:00.000`)
    pub fn to_isot(&self) -> String {
        self.to_datetime()
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        let nanos = dt
            .timestamp_nanos_opt()
            .unwrap_or_else(|| dt.timestamp().saturating_mul(NANOS_PER_SEC));
        Self { nanos }
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Parse RFC 3339 text, a naive UTC date-time, or a bare date.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from(dt.with_timezone(&Utc)));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::from(naive.and_utc()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::from(naive.and_utc()));
            }
        }
        Err(Error::Temporal(format!("Unparseable timestamp '{}'", s)))
    }
}

/// Closed time range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start > end {
            return Err(Error::Temporal(format!(
                "Range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range whose bounds the caller has already ordered
    pub(crate) fn new_unchecked(start: Timestamp, end: Timestamp) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Smallest range holding every sample of a non-empty time axis
    pub fn spanning(time: &[Timestamp]) -> Result<Self> {
        match (time.iter().min(), time.iter().max()) {
            (Some(first), Some(last)) => Self::new(*first, *last),
            _ => Err(Error::Temporal(
                "Cannot derive a time range from an empty time series".to_string(),
            )),
        }
    }

    /// Range covering every representable timestamp
    pub fn unbounded() -> Self {
        Self {
            start: Timestamp::from_nanos(i64::MIN),
            end: Timestamp::from_nanos(i64::MAX),
        }
    }

    /// Get the start timestamp
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Get the end timestamp
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Inclusive at both ends
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Whether two closed ranges share at least one instant
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
