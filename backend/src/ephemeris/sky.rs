//! Bundled ephemeris: siderust for astronomical night, sidereal time for
//! fixed targets, and the lunar series for the Moon.

use chrono::{DateTime, NaiveDate, Utc};

use super::lunar::{moon_coordinates, phase_and_fraction};
use super::night::compute_astronomical_nights;
use super::{
    normalize_degrees, Body, CrossingDirection, EphemerisAdapter, EphemerisResult, Equatorial,
    LunarAdapter, NightInterval,
};
use crate::error::EphemerisError;
use crate::models::time::add_minutes;
use crate::models::{Horizontal, Location, ModifiedJulianDate, MoonIllumination, MoonTimes};

/// Coarse step of the crossing scan.
const SEARCH_STEP_MINUTES: f64 = 10.0;
/// Upper bound on any single crossing search.
const MAX_SEARCH_DAYS: f64 = 400.0;
/// Bisection rounds after a bracket is found (10 min / 2^20 < 1 ms).
const REFINE_ITERATIONS: usize = 20;
/// Altitude of the Moon's centre at rise/set (semi-diameter + refraction - parallax).
const MOON_HORIZON_ALTITUDE: f64 = 0.125;
const EARTH_RADIUS_KM: f64 = 6378.14;

/// Default adapter for both the celestial and lunar contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkyEphemeris;

impl SkyEphemeris {
    pub fn new() -> Self {
        Self
    }

    fn altitude_of(
        &self,
        body: Body,
        time: DateTime<Utc>,
        observer: &Location,
    ) -> EphemerisResult<f64> {
        let position = match body {
            Body::Moon => self.moon_position(time, observer)?,
            Body::Fixed(target) => self.horizontal_position(time, observer, &target)?,
        };
        Ok(position.altitude)
    }

    fn refine_crossing(
        &self,
        body: Body,
        observer: &Location,
        direction: CrossingDirection,
        (mut lo, mut alt_lo): (DateTime<Utc>, f64),
        mut hi: DateTime<Utc>,
        target: f64,
    ) -> EphemerisResult<DateTime<Utc>> {
        for _ in 0..REFINE_ITERATIONS {
            let mid = lo + (hi - lo) / 2;
            if mid == lo || mid == hi {
                break;
            }
            let alt_mid = self.altitude_of(body, mid, observer)?;
            if direction.crosses(alt_lo, alt_mid, target) {
                hi = mid;
            } else {
                lo = mid;
                alt_lo = alt_mid;
            }
        }
        Ok(hi)
    }
}

impl EphemerisAdapter for SkyEphemeris {
    fn horizontal_position(
        &self,
        time: DateTime<Utc>,
        observer: &Location,
        target: &Equatorial,
    ) -> EphemerisResult<Horizontal> {
        check_observer(observer)?;
        if !target.ra.is_finite() || !target.dec.is_finite() {
            return Err(EphemerisError::NonFiniteInput("target coordinates"));
        }
        let mjd = ModifiedJulianDate::from_datetime(time);
        checked_horizontal(equatorial_to_horizontal(
            target,
            observer.lat,
            local_sidereal_degrees(mjd, observer.lng),
        ))
    }

    fn search_altitude_crossing(
        &self,
        body: Body,
        observer: &Location,
        direction: CrossingDirection,
        start: DateTime<Utc>,
        max_days: f64,
        target_altitude: f64,
    ) -> EphemerisResult<Option<DateTime<Utc>>> {
        if !max_days.is_finite() {
            return Err(EphemerisError::NonFiniteInput("max_days"));
        }
        if !target_altitude.is_finite() {
            return Err(EphemerisError::NonFiniteInput("target_altitude"));
        }

        let span_minutes = max_days.clamp(0.0, MAX_SEARCH_DAYS) * 1440.0;
        let steps = (span_minutes / SEARCH_STEP_MINUTES).ceil() as usize;

        let mut prev = (start, self.altitude_of(body, start, observer)?);
        for i in 1..=steps {
            let offset = (i as f64 * SEARCH_STEP_MINUTES).min(span_minutes);
            let t = add_minutes(start, offset);
            let alt = self.altitude_of(body, t, observer)?;
            if direction.crosses(prev.1, alt, target_altitude) {
                let refined =
                    self.refine_crossing(body, observer, direction, prev, t, target_altitude)?;
                return Ok(Some(refined));
            }
            prev = (t, alt);
        }
        Ok(None)
    }

    fn sidereal_time(&self, time: DateTime<Utc>) -> EphemerisResult<f64> {
        let mjd = ModifiedJulianDate::from_datetime(time);
        Ok(gmst_degrees(mjd) / 15.0)
    }

    fn astronomical_nights(
        &self,
        observer: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EphemerisResult<Vec<NightInterval>> {
        check_observer(observer)?;
        if end <= start {
            return Err(EphemerisError::InvalidResult(format!(
                "empty night search window {} .. {}",
                start, end
            )));
        }
        Ok(compute_astronomical_nights(observer, start, end))
    }
}

impl LunarAdapter for SkyEphemeris {
    fn moon_position(
        &self,
        time: DateTime<Utc>,
        observer: &Location,
    ) -> EphemerisResult<Horizontal> {
        check_observer(observer)?;
        let mjd = ModifiedJulianDate::from_datetime(time);
        let moon = moon_coordinates(mjd.julian_centuries());
        let geocentric = equatorial_to_horizontal(
            &moon.equatorial,
            observer.lat,
            local_sidereal_degrees(mjd, observer.lng),
        );
        // Parallax in altitude; close to 1° near the horizon.
        let parallax = (EARTH_RADIUS_KM / moon.distance_km).asin().to_degrees()
            * geocentric.altitude.to_radians().cos();
        checked_horizontal(Horizontal::new(
            geocentric.altitude - parallax,
            geocentric.azimuth,
        ))
    }

    fn moon_illumination(&self, time: DateTime<Utc>) -> EphemerisResult<MoonIllumination> {
        let t = ModifiedJulianDate::from_datetime(time).julian_centuries();
        let (phase, fraction) = phase_and_fraction(t);
        if !fraction.is_finite() || !phase.is_finite() {
            return Err(EphemerisError::InvalidResult(
                "lunar illumination is not finite".to_string(),
            ));
        }
        Ok(MoonIllumination {
            phase,
            fraction: fraction.clamp(0.0, 1.0),
        })
    }

    fn moon_times(&self, date: NaiveDate, observer: &Location) -> EphemerisResult<MoonTimes> {
        let start = observer.local_midnight(date);
        let rise = self.search_altitude_crossing(
            Body::Moon,
            observer,
            CrossingDirection::Rising,
            start,
            1.0,
            MOON_HORIZON_ALTITUDE,
        )?;
        let set = self.search_altitude_crossing(
            Body::Moon,
            observer,
            CrossingDirection::Setting,
            start,
            1.0,
            MOON_HORIZON_ALTITUDE,
        )?;
        Ok(MoonTimes { rise, set })
    }
}

fn check_observer(observer: &Location) -> EphemerisResult<()> {
    if observer.lat.is_finite() && observer.lng.is_finite() {
        Ok(())
    } else {
        Err(EphemerisError::NonFiniteInput("observer location"))
    }
}

fn checked_horizontal(position: Horizontal) -> EphemerisResult<Horizontal> {
    if !position.altitude.is_finite() || !position.azimuth.is_finite() {
        return Err(EphemerisError::InvalidResult(format!(
            "horizontal position out of range: {:?}",
            position
        )));
    }
    Ok(Horizontal::new(
        position.altitude.clamp(-90.0, 90.0),
        normalize_degrees(position.azimuth),
    ))
}

/// Greenwich mean sidereal time in degrees (Meeus 12.4).
fn gmst_degrees(mjd: ModifiedJulianDate) -> f64 {
    let t = mjd.julian_centuries();
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * mjd.days_since_j2000() + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

fn local_sidereal_degrees(mjd: ModifiedJulianDate, longitude: f64) -> f64 {
    normalize_degrees(gmst_degrees(mjd) + longitude)
}

/// Equatorial to horizontal; azimuth from north through east.
fn equatorial_to_horizontal(target: &Equatorial, latitude: f64, lst: f64) -> Horizontal {
    let h = (lst - target.ra).to_radians();
    let dec = target.dec.to_radians();
    let lat = latitude.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth = (-dec.cos() * h.sin())
        .atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * h.cos())
        .to_degrees();

    Horizontal::new(altitude, normalize_degrees(azimuth))
}
