use chrono::{DateTime, Duration, Utc};
use serde::*;

/// Julian Date of the MJD epoch (1858-11-17 00:00:00 UTC).
pub const MJD_EPOCH_JD: f64 = 2_400_000.5;

/// Julian Date of the J2000.0 epoch.
pub const J2000_JD: f64 = 2_451_545.0;

/// Length of a sidereal day in hours.
pub const SIDEREAL_DAY_HOURS: f64 = 23.934_469_6;

/// Modified Julian Date representation.
/// MJD 0 = 1858-11-17 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ModifiedJulianDate(qtty::Days);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Full Julian Date.
    pub fn julian_date(&self) -> f64 {
        self.value() + MJD_EPOCH_JD
    }

    /// Julian centuries elapsed since J2000.0.
    pub fn julian_centuries(&self) -> f64 {
        (self.julian_date() - J2000_JD) / 36525.0
    }

    /// Days elapsed since J2000.0.
    pub fn days_since_j2000(&self) -> f64 {
        self.julian_date() - J2000_JD
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - 40587.0) * 86400.0
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / 86400.0 + 40587.0)
    }

    /// Convert to chrono DateTime<Utc>.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let secs = self.to_unix_timestamp();
        let secs_i64 = secs.floor() as i64;
        let nanos = ((secs - secs.floor()) * 1e9) as u32;
        DateTime::from_timestamp(secs_i64, nanos).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}

impl From<DateTime<Utc>> for ModifiedJulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        ModifiedJulianDate::from_datetime(dt)
    }
}

/// Shift an instant by a fractional number of hours (millisecond resolution).
pub fn add_hours(time: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    time + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Shift an instant by a fractional number of minutes (millisecond resolution).
pub fn add_minutes(time: DateTime<Utc>, minutes: f64) -> DateTime<Utc> {
    time + Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

/// Signed difference `later - earlier` in fractional hours.
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// Signed difference `later - earlier` in fractional minutes.
pub fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
