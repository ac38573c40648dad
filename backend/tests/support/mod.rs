#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gc_planner::ephemeris::{
    Body, CrossingDirection, EphemerisAdapter, EphemerisResult, Equatorial, LunarAdapter,
    NightInterval,
};
use gc_planner::error::EphemerisError;
use gc_planner::models::{Horizontal, Location, MoonIllumination, MoonTimes};
use gc_planner::services::{ScoringInputs, SkyModel};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn joshua_tree() -> Location {
    Location::new(34.0, -116.0).unwrap()
}

/// Night 03:00-10:00 UTC with the core up from 02:00 to 11:00.
pub fn summer_night_inputs(location: Location) -> ScoringInputs {
    ScoringInputs {
        location,
        night_start: Some(utc(2024, 7, 16, 3, 0)),
        night_end: Some(utc(2024, 7, 16, 10, 0)),
        core_rise: Some(utc(2024, 7, 16, 2, 0)),
        core_set: Some(utc(2024, 7, 16, 11, 0)),
    }
}

/// Sky frozen in place for the whole night.
#[derive(Debug, Clone, Copy)]
pub struct StaticSky {
    pub core: Horizontal,
    pub moon: Horizontal,
    pub illumination: f64,
}

impl StaticSky {
    pub fn moonless(core_altitude: f64) -> Self {
        Self {
            core: Horizontal::new(core_altitude, 180.0),
            moon: Horizontal::new(-25.0, 0.0),
            illumination: 0.0,
        }
    }

    pub fn with_moon(
        core_altitude: f64,
        moon_altitude: f64,
        moon_azimuth: f64,
        illumination: f64,
    ) -> Self {
        Self {
            core: Horizontal::new(core_altitude, 180.0),
            moon: Horizontal::new(moon_altitude, moon_azimuth),
            illumination,
        }
    }
}

impl SkyModel for StaticSky {
    fn core_position(&self, _time: DateTime<Utc>) -> EphemerisResult<Horizontal> {
        Ok(self.core)
    }

    fn moon_position(&self, _time: DateTime<Utc>) -> EphemerisResult<Horizontal> {
        Ok(self.moon)
    }

    fn moon_illumination(&self, _time: DateTime<Utc>) -> EphemerisResult<f64> {
        Ok(self.illumination)
    }
}

/// Adapter that fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEphemeris;

fn offline<T>() -> EphemerisResult<T> {
    Err(EphemerisError::Unavailable("offline".to_string()))
}

impl EphemerisAdapter for OfflineEphemeris {
    fn horizontal_position(
        &self,
        _time: DateTime<Utc>,
        _observer: &Location,
        _target: &Equatorial,
    ) -> EphemerisResult<Horizontal> {
        offline()
    }

    fn search_altitude_crossing(
        &self,
        _body: Body,
        _observer: &Location,
        _direction: CrossingDirection,
        _start: DateTime<Utc>,
        _max_days: f64,
        _target_altitude: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        offline()
    }

    fn sidereal_time(&self, _time: DateTime<Utc>) -> EphemerisResult<f64> {
        offline()
    }

    fn astronomical_nights(
        &self,
        _observer: &Location,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> EphemerisResult<Vec<NightInterval>> {
        offline()
    }
}

impl LunarAdapter for OfflineEphemeris {
    fn moon_position(
        &self,
        _time: DateTime<Utc>,
        _observer: &Location,
    ) -> EphemerisResult<Horizontal> {
        offline()
    }

    fn moon_illumination(&self, _time: DateTime<Utc>) -> EphemerisResult<MoonIllumination> {
        offline()
    }

    fn moon_times(&self, _date: NaiveDate, _observer: &Location) -> EphemerisResult<MoonTimes> {
        offline()
    }
}
