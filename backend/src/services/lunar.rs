//! Moon locator: position, phase and rise/set for a night.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, warn};

use crate::ephemeris::{EphemerisResult, LunarAdapter};
use crate::models::{Location, LunarState, MoonTimes};

/// Lunar state at `at`, with rise/set for the local calendar day `date`.
///
/// When the day's set precedes its rise the set is taken from the next day,
/// so the pair always describes one continuous period above the horizon.
/// Adapter failures produce [`LunarState::default`].
pub fn locate_moon(
    lunar: &dyn LunarAdapter,
    date: NaiveDate,
    at: DateTime<Utc>,
    location: &Location,
) -> LunarState {
    match try_locate(lunar, date, at, location) {
        Ok(state) => state,
        Err(e) => {
            warn!(
                "Lunar ephemeris failed for {} at ({}, {}): {}",
                date, location.lat, location.lng, e
            );
            LunarState::default()
        }
    }
}

fn try_locate(
    lunar: &dyn LunarAdapter,
    date: NaiveDate,
    at: DateTime<Utc>,
    location: &Location,
) -> EphemerisResult<LunarState> {
    let position = lunar.moon_position(at, location)?;
    let illumination = lunar.moon_illumination(at)?;
    let times = lunar.moon_times(date, location)?;
    let times = normalize_rise_set(lunar, date, location, times);

    debug!(
        "Moon at {}: alt={:.2} illumination={:.2} rise={:?} set={:?}",
        at, position.altitude, illumination.fraction, times.rise, times.set
    );

    Ok(LunarState {
        phase: illumination.phase,
        illumination: illumination.fraction,
        altitude: position.altitude,
        azimuth: position.azimuth,
        rise: times.rise,
        set: times.set,
    })
}

fn normalize_rise_set(
    lunar: &dyn LunarAdapter,
    date: NaiveDate,
    location: &Location,
    times: MoonTimes,
) -> MoonTimes {
    let (Some(rise), Some(set)) = (times.rise, times.set) else {
        return times;
    };
    if set >= rise {
        return times;
    }

    let next_set = date
        .checked_add_signed(Duration::days(1))
        .and_then(|next| match lunar.moon_times(next, location) {
            Ok(next_times) => next_times.set,
            Err(e) => {
                warn!("Next-day moonset lookup failed for {}: {}", next, e);
                None
            }
        })
        .filter(|next_set| *next_set > rise);

    MoonTimes {
        rise: Some(rise),
        set: next_set,
    }
}
