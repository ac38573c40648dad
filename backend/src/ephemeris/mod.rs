//! Ephemeris, lunar and timezone adapter contracts.
//!
//! The locators in [`crate::services`] only talk to these traits. The crate
//! ships [`SkyEphemeris`] (siderust twilight, a low-precision lunar series)
//! and a few timezone adapters; anything more precise can be plugged in by
//! implementing the same traits.

pub mod lunar;
pub mod night;
pub mod sky;
pub mod timezone;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EphemerisError;
use crate::models::{Horizontal, Location, MoonIllumination, MoonTimes};

pub use sky::SkyEphemeris;
pub use timezone::{
    CachedTimezone, FixedOffsetTimezone, LongitudeTimezone, TimezoneAdapter, TimezoneCache,
};

/// Result type for adapter calls.
pub type EphemerisResult<T> = Result<T, EphemerisError>;

/// `(start, end)` of a period of astronomical night.
pub type NightInterval = (DateTime<Utc>, DateTime<Utc>);

/// Equatorial (J2000) coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra: f64,
    pub dec: f64,
}

impl Equatorial {
    /// Sagittarius A*, the reference point for the galactic core.
    pub const GALACTIC_CORE: Equatorial = Equatorial {
        ra: 266.416_83,
        dec: -29.007_81,
    };

    pub const fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

/// Body whose altitude crossings can be searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Moon,
    Fixed(Equatorial),
}

/// Direction of an altitude crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDirection {
    /// Altitude increasing through the target
    Rising,
    /// Altitude decreasing through the target
    Setting,
}

impl CrossingDirection {
    /// True when the step `before -> after` crosses `target` in this direction.
    pub fn crosses(&self, before: f64, after: f64, target: f64) -> bool {
        match self {
            Self::Rising => before < target && after >= target,
            Self::Setting => before >= target && after < target,
        }
    }
}

/// Celestial ephemeris contract.
pub trait EphemerisAdapter: Send + Sync {
    /// Horizontal coordinates of a fixed equatorial target.
    fn horizontal_position(
        &self,
        time: DateTime<Utc>,
        observer: &Location,
        target: &Equatorial,
    ) -> EphemerisResult<Horizontal>;

    /// First time after `start` (within `max_days`) at which `body` crosses
    /// `target_altitude` in `direction`.
    fn search_altitude_crossing(
        &self,
        body: Body,
        observer: &Location,
        direction: CrossingDirection,
        start: DateTime<Utc>,
        max_days: f64,
        target_altitude: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>>;

    /// Greenwich mean sidereal time, in hours [0, 24).
    fn sidereal_time(&self, time: DateTime<Utc>) -> EphemerisResult<f64>;

    /// Periods with the Sun below -18° overlapping `[start, end]`, clipped
    /// to it and in time order.
    fn astronomical_nights(
        &self,
        observer: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EphemerisResult<Vec<NightInterval>>;
}

/// Lunar ephemeris contract.
pub trait LunarAdapter: Send + Sync {
    fn moon_position(&self, time: DateTime<Utc>, observer: &Location)
        -> EphemerisResult<Horizontal>;

    fn moon_illumination(&self, time: DateTime<Utc>) -> EphemerisResult<MoonIllumination>;

    /// Moonrise and moonset within the local calendar day `date`.
    fn moon_times(&self, date: NaiveDate, observer: &Location) -> EphemerisResult<MoonTimes>;
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
