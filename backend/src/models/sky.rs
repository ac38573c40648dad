//! Value objects produced by the locators: galactic core, Moon and night.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::time::hours_between;

/// Horizontal (alt/az) coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Horizontal {
    /// Altitude above the horizon, [-90, 90]
    pub altitude: f64,
    /// Azimuth measured from north through east, [0, 360)
    pub azimuth: f64,
}

impl Horizontal {
    pub fn new(altitude: f64, azimuth: f64) -> Self {
        Self { altitude, azimuth }
    }

    /// Great-circle separation to another horizontal position, in degrees.
    pub fn separation(&self, other: &Horizontal) -> f64 {
        let (alt1, az1) = (self.altitude.to_radians(), self.azimuth.to_radians());
        let (alt2, az2) = (other.altitude.to_radians(), other.azimuth.to_radians());
        let cos_sep = alt1.sin() * alt2.sin() + alt1.cos() * alt2.cos() * (az1 - az2).cos();
        cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
    }
}

/// One rise/set pair of the galactic core above its altitude threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorePass {
    pub rise: DateTime<Utc>,
    pub set: DateTime<Utc>,
}

impl CorePass {
    /// Hours of overlap with `[start, end]`, zero when disjoint.
    pub fn overlap_hours(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        let from = self.rise.max(start);
        let to = self.set.min(end);
        hours_between(from, to).max(0.0)
    }
}

/// Apparent position and threshold crossings of the galactic core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalacticCoreState {
    pub altitude: f64,
    pub azimuth: f64,
    pub rise_time: Option<DateTime<Utc>>,
    /// Meridian transit. Outside `[rise, set]` unless `transit_in_pass`.
    pub transit_time: Option<DateTime<Utc>>,
    /// `transit_time` was placed inside the primary pass. False when the raw
    /// sidereal estimate is reported instead, as happens when the core is
    /// already up at the scan start and culminated before it: the scan start
    /// stands in for the rise and the true transit precedes it.
    #[serde(default)]
    pub transit_in_pass: bool,
    pub set_time: Option<DateTime<Utc>>,
    /// Altitude is at or above `threshold` at the reference instant
    pub is_visible: bool,
    /// Month-dependent altitude threshold used for the crossings
    pub threshold: qtty::Degrees,
    /// Every rise/set pair found in the search window, chronological
    #[serde(default)]
    pub passes: Vec<CorePass>,
}

impl GalacticCoreState {
    /// Neutral state returned when the ephemeris cannot be queried.
    pub fn unavailable(threshold: qtty::Degrees) -> Self {
        Self {
            altitude: 0.0,
            azimuth: 0.0,
            rise_time: None,
            transit_time: None,
            transit_in_pass: false,
            set_time: None,
            is_visible: false,
            threshold,
            passes: Vec::new(),
        }
    }

    /// Primary rise/set pair, when both were found.
    pub fn primary_pass(&self) -> Option<CorePass> {
        match (self.rise_time, self.set_time) {
            (Some(rise), Some(set)) => Some(CorePass { rise, set }),
            _ => None,
        }
    }

    /// The pass with the largest overlap with `night`, or the primary pass
    /// when none overlaps.
    pub fn pass_for_night(&self, night: &NightWindow) -> Option<CorePass> {
        let best = night.bounds().and_then(|(start, end)| {
            self.passes
                .iter()
                .map(|pass| (pass, pass.overlap_hours(start, end)))
                .filter(|(_, overlap)| *overlap > 0.0)
                .fold(None::<(&CorePass, f64)>, |best, candidate| match best {
                    Some((_, overlap)) if overlap >= candidate.1 => best,
                    _ => Some(candidate),
                })
                .map(|(pass, _)| *pass)
        });
        best.or_else(|| self.primary_pass())
    }
}

/// Position, phase and rise/set of the Moon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LunarState {
    /// Synodic phase: 0 new, 0.25 first quarter, 0.5 full, 0.75 last quarter
    pub phase: f64,
    /// Illuminated fraction of the disc, [0, 1]
    pub illumination: f64,
    pub altitude: f64,
    pub azimuth: f64,
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
}

/// Illumination figures of the Moon at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoonIllumination {
    pub phase: f64,
    pub fraction: f64,
}

/// Rise/set of the Moon within one calendar day; either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoonTimes {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
}

/// Astronomical dusk of a date and the following astronomical dawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightWindow {
    /// Astronomical dusk (Sun descending through -18°)
    pub night: Option<DateTime<Utc>>,
    /// Astronomical dawn of the following calendar day
    pub day_end: Option<DateTime<Utc>>,
}

impl NightWindow {
    pub fn new(night: Option<DateTime<Utc>>, day_end: Option<DateTime<Utc>>) -> Self {
        Self { night, day_end }
    }

    /// Both boundaries, when known.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.night, self.day_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}
