//! Galactic core locator.
//!
//! Samples the core's altitude every 10 minutes from 6 h before the reference
//! instant to 36 h after it, and records every crossing of the month-dependent
//! altitude threshold. Crossings are placed between the bracketing samples by
//! linear interpolation.

use chrono::{DateTime, Datelike, Utc};
use log::{debug, warn};

use crate::ephemeris::{EphemerisAdapter, EphemerisResult, Equatorial};
use crate::models::time::{add_hours, add_minutes, minutes_between, SIDEREAL_DAY_HOURS};
use crate::models::{CorePass, GalacticCoreState, Location};

pub const SAMPLE_STEP_MINUTES: f64 = 10.0;
pub const LOOKBACK_HOURS: f64 = 6.0;
pub const LOOKAHEAD_HOURS: f64 = 36.0;
/// Extra 36 h scans allowed when the core is still up at the end of the window.
const MAX_SET_EXTENSIONS: usize = 1;
/// Whole sidereal days the transit estimate may be moved to land in [rise, set].
const MAX_SIDEREAL_SHIFTS: usize = 4;

/// Minimum useful core altitude for the month: the core culminates lower in
/// the evening sky as the season moves on, so the bar drops with it.
pub fn altitude_threshold(month: u32) -> qtty::Degrees {
    let degrees = match month {
        1..=7 => 20.0,
        8 | 9 => 15.0,
        _ => 10.0,
    };
    qtty::Degrees::new(degrees)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossingKind {
    Rise,
    Set,
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    kind: CrossingKind,
    time: DateTime<Utc>,
}

struct Scan {
    crossings: Vec<Crossing>,
    above_at_start: bool,
    above_at_end: bool,
}

/// Altitude, azimuth and rise/transit/set of the galactic core around `date`.
///
/// Never fails: an ephemeris error yields [`GalacticCoreState::unavailable`].
pub fn locate_galactic_core(
    ephemeris: &dyn EphemerisAdapter,
    date: DateTime<Utc>,
    location: &Location,
) -> GalacticCoreState {
    let threshold = altitude_threshold(date.month());
    match try_locate(ephemeris, date, location, threshold) {
        Ok(state) => state,
        Err(e) => {
            warn!(
                "Galactic core ephemeris failed at {} for ({}, {}): {}",
                date, location.lat, location.lng, e
            );
            GalacticCoreState::unavailable(threshold)
        }
    }
}

fn try_locate(
    ephemeris: &dyn EphemerisAdapter,
    date: DateTime<Utc>,
    location: &Location,
    threshold: qtty::Degrees,
) -> EphemerisResult<GalacticCoreState> {
    let target = Equatorial::GALACTIC_CORE;
    let current = ephemeris.horizontal_position(date, location, &target)?;

    let window_start = add_hours(date, -LOOKBACK_HOURS);
    let window_end = add_hours(date, LOOKAHEAD_HOURS);
    let scan = scan_crossings(ephemeris, location, window_start, window_end, threshold.value())?;

    let mut crossings = Vec::with_capacity(scan.crossings.len() + 1);
    if scan.above_at_start {
        crossings.push(Crossing {
            kind: CrossingKind::Rise,
            time: window_start,
        });
    }
    crossings.extend(scan.crossings);

    let primary_rise = crossings
        .iter()
        .position(|c| c.kind == CrossingKind::Rise);
    let has_set_after_rise = primary_rise
        .map(|i| crossings[i + 1..].iter().any(|c| c.kind == CrossingKind::Set))
        .unwrap_or(false);

    if primary_rise.is_some() && !has_set_after_rise && scan.above_at_end {
        let mut extension_start = window_end;
        for _ in 0..MAX_SET_EXTENSIONS {
            let extension_end = add_hours(extension_start, LOOKAHEAD_HOURS);
            let extension = scan_crossings(
                ephemeris,
                location,
                extension_start,
                extension_end,
                threshold.value(),
            )?;
            let found_set = extension
                .crossings
                .iter()
                .any(|c| c.kind == CrossingKind::Set);
            crossings.extend(extension.crossings);
            if found_set {
                break;
            }
            extension_start = extension_end;
        }
    }

    let passes = pair_passes(&crossings);
    let (rise_time, set_time) = match passes.first() {
        Some(pass) => (Some(pass.rise), Some(pass.set)),
        None => (
            crossings
                .iter()
                .find(|c| c.kind == CrossingKind::Rise)
                .map(|c| c.time),
            None,
        ),
    };

    let (transit_time, transit_in_pass) =
        transit_time(ephemeris, date, location, &target, rise_time, set_time)?;

    debug!(
        "Galactic core at {}: alt={:.2} az={:.2} threshold={} passes={}",
        date,
        current.altitude,
        current.azimuth,
        threshold.value(),
        passes.len()
    );

    Ok(GalacticCoreState {
        altitude: current.altitude,
        azimuth: current.azimuth,
        rise_time,
        transit_time,
        transit_in_pass,
        set_time,
        is_visible: current.altitude >= threshold.value(),
        threshold,
        passes,
    })
}

/// Sample `[start, end]` every [`SAMPLE_STEP_MINUTES`] and interpolate each
/// threshold crossing.
fn scan_crossings(
    ephemeris: &dyn EphemerisAdapter,
    location: &Location,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    threshold: f64,
) -> EphemerisResult<Scan> {
    let target = Equatorial::GALACTIC_CORE;
    let span = minutes_between(start, end).max(0.0);
    let steps = (span / SAMPLE_STEP_MINUTES).ceil() as usize;

    let first = ephemeris.horizontal_position(start, location, &target)?.altitude;
    let mut crossings = Vec::new();
    let (mut prev_offset, mut prev_alt) = (0.0, first);

    for i in 1..=steps {
        let offset = (i as f64 * SAMPLE_STEP_MINUTES).min(span);
        let alt = ephemeris
            .horizontal_position(add_minutes(start, offset), location, &target)?
            .altitude;

        let kind = if prev_alt < threshold && alt >= threshold {
            Some(CrossingKind::Rise)
        } else if prev_alt >= threshold && alt < threshold {
            Some(CrossingKind::Set)
        } else {
            None
        };

        if let Some(kind) = kind {
            let fraction = (threshold - prev_alt) / (alt - prev_alt);
            let crossing_offset = prev_offset + fraction.clamp(0.0, 1.0) * (offset - prev_offset);
            crossings.push(Crossing {
                kind,
                time: add_minutes(start, crossing_offset),
            });
        }
        prev_offset = offset;
        prev_alt = alt;
    }

    Ok(Scan {
        crossings,
        above_at_start: first >= threshold,
        above_at_end: prev_alt >= threshold,
    })
}

/// Pair each rise with the first set that follows it.
fn pair_passes(crossings: &[Crossing]) -> Vec<CorePass> {
    let mut passes = Vec::new();
    let mut pending_rise: Option<DateTime<Utc>> = None;
    for crossing in crossings {
        match (crossing.kind, pending_rise) {
            (CrossingKind::Rise, None) => pending_rise = Some(crossing.time),
            (CrossingKind::Set, Some(rise)) if crossing.time > rise => {
                passes.push(CorePass {
                    rise,
                    set: crossing.time,
                });
                pending_rise = None;
            }
            _ => {}
        }
    }
    passes
}

/// Meridian transit from local sidereal time, moved by whole sidereal days
/// into `[rise, set]` when possible. Outside a pass the raw estimate is
/// returned for information only and the flag is false.
fn transit_time(
    ephemeris: &dyn EphemerisAdapter,
    date: DateTime<Utc>,
    location: &Location,
    target: &Equatorial,
    rise: Option<DateTime<Utc>>,
    set: Option<DateTime<Utc>>,
) -> EphemerisResult<(Option<DateTime<Utc>>, bool)> {
    let lst = (ephemeris.sidereal_time(date)? + location.lng / 15.0).rem_euclid(24.0);
    let hour_angle = (lst - target.ra / 15.0 + 12.0).rem_euclid(24.0) - 12.0;
    let estimate = add_hours(date, -hour_angle * SIDEREAL_DAY_HOURS / 24.0);

    if let (Some(rise), Some(set)) = (rise, set) {
        let mut candidate = estimate;
        for _ in 0..=MAX_SIDEREAL_SHIFTS {
            if candidate < rise {
                candidate = add_hours(candidate, SIDEREAL_DAY_HOURS);
            } else if candidate > set {
                candidate = add_hours(candidate, -SIDEREAL_DAY_HOURS);
            } else {
                return Ok((Some(candidate), true));
            }
        }
    }
    Ok((Some(estimate), false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::SkyEphemeris;
    use chrono::TimeZone;

    #[test]
    fn test_altitude_threshold_by_month() {
        assert_eq!(altitude_threshold(1).value(), 20.0);
        assert_eq!(altitude_threshold(7).value(), 20.0);
        assert_eq!(altitude_threshold(8).value(), 15.0);
        assert_eq!(altitude_threshold(9).value(), 15.0);
        assert_eq!(altitude_threshold(10).value(), 10.0);
        assert_eq!(altitude_threshold(12).value(), 10.0);
    }

    #[test]
    fn test_pair_passes_skips_orphans() {
        let t = |h| Utc.with_ymd_and_hms(2024, 7, 15, h, 0, 0).unwrap();
        let crossings = [
            Crossing { kind: CrossingKind::Set, time: t(1) },
            Crossing { kind: CrossingKind::Rise, time: t(3) },
            Crossing { kind: CrossingKind::Set, time: t(8) },
            Crossing { kind: CrossingKind::Rise, time: t(20) },
        ];
        let passes = pair_passes(&crossings);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].rise, t(3));
        assert_eq!(passes[0].set, t(8));
    }

    #[test]
    fn test_joshua_tree_july_has_ordered_pass() {
        let eph = SkyEphemeris::new();
        let loc = Location::new(34.0, -116.0).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 7, 15, 20, 0, 0).unwrap();
        let state = locate_galactic_core(&eph, date, &loc);

        let rise = state.rise_time.expect("core rises");
        let set = state.set_time.expect("core sets");
        let transit = state.transit_time.expect("transit estimate");
        assert!(rise < set);
        assert!(rise <= transit && transit <= set, "{} {} {}", rise, transit, set);
        assert!(state.transit_in_pass);
        assert_eq!(state.threshold.value(), 20.0);

        // Culmination at 34N is about 27 degrees, above the July threshold.
        let peak = eph
            .horizontal_position(transit, &loc, &Equatorial::GALACTIC_CORE)
            .unwrap();
        assert!((peak.altitude - 27.0).abs() < 1.0, "peak {}", peak.altitude);
    }

    #[test]
    fn test_core_never_clears_threshold_far_north() {
        let eph = SkyEphemeris::new();
        let loc = Location::new(65.0, 25.0).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let state = locate_galactic_core(&eph, date, &loc);
        assert!(state.rise_time.is_none());
        assert!(state.set_time.is_none());
        assert!(state.passes.is_empty());
        assert!(!state.is_visible);
        assert!(state.transit_time.is_some());
        assert!(!state.transit_in_pass);
    }

    #[test]
    fn test_transit_before_scan_start_is_not_in_pass() {
        // Local mean noon at 116W; the scan starts 6 h earlier, at 13:44 UTC,
        // with the core already up and past its 13:35 culmination.
        let eph = SkyEphemeris::new();
        let loc = Location::new(34.0, -116.0).unwrap();
        let date = loc.local_noon(chrono::NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        let state = locate_galactic_core(&eph, date, &loc);

        let rise = state.rise_time.expect("scan start stands in for the rise");
        let set = state.set_time.expect("core sets before dawn");
        let transit = state.transit_time.expect("transit estimate");
        assert_eq!(rise, add_hours(date, -LOOKBACK_HOURS));
        assert!(rise < set);
        assert!(transit < rise, "transit {} rise {}", transit, rise);
        assert!((minutes_between(transit, rise) - 9.0).abs() < 5.0);
        assert!(!state.transit_in_pass);
    }

    #[test]
    fn test_circumpolar_core_has_no_set() {
        let eph = SkyEphemeris::new();
        // Dec -29 is circumpolar south of -61 and stays above 20 degrees below -81.
        let loc = Location::new(-85.0, 0.0).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let state = locate_galactic_core(&eph, date, &loc);
        assert_eq!(state.rise_time, Some(add_hours(date, -LOOKBACK_HOURS)));
        assert!(state.set_time.is_none());
        assert!(state.is_visible);
    }
}
