//! Observation scorer.
//!
//! Turns a night window, the core's rise/set and the sky along the way into
//! a sampled quality curve, a window-adjusted score and a 0-4 rating.
//!
//! The sky is read through [`SkyModel`] so the scorer can be driven by a real
//! ephemeris ([`EphemerisSky`]) or by a scripted model in tests.

use chrono::{DateTime, Utc};
use log::debug;

use crate::config::ScoringSettings;
use crate::ephemeris::{EphemerisAdapter, EphemerisResult, Equatorial, LunarAdapter};
use crate::models::time::{add_minutes, minutes_between};
use crate::models::{Horizontal, Location, ObservationScore, Rating, VisibilitySample};
use crate::services::reasons::{select_reason, ReasonContext};

pub const REASON_LATITUDE: &str = "Galactic Center never visible at this latitude";
pub const REASON_NO_DARKNESS: &str = "No astronomical darkness tonight";
pub const REASON_NO_RISE: &str = "Galactic Center does not rise above threshold";
pub const REASON_NO_SAMPLES: &str = "No observation time above altitude cutoff";

/// Illumination above which the Moon drowns the core wherever it is.
pub const BRIGHT_MOON_ILLUMINATION: f64 = 0.6;
/// Separation at which a dim Moon stops mattering, degrees.
pub const FULL_SEPARATION_DEG: f64 = 90.0;

/// Positions and Moon brightness at an instant, for one observer.
pub trait SkyModel {
    fn core_position(&self, time: DateTime<Utc>) -> EphemerisResult<Horizontal>;
    fn moon_position(&self, time: DateTime<Utc>) -> EphemerisResult<Horizontal>;
    /// Illuminated fraction in [0, 1]
    fn moon_illumination(&self, time: DateTime<Utc>) -> EphemerisResult<f64>;
}

/// [`SkyModel`] backed by the ephemeris and lunar adapters.
pub struct EphemerisSky<'a> {
    ephemeris: &'a dyn EphemerisAdapter,
    lunar: &'a dyn LunarAdapter,
    location: Location,
}

impl<'a> EphemerisSky<'a> {
    pub fn new(
        ephemeris: &'a dyn EphemerisAdapter,
        lunar: &'a dyn LunarAdapter,
        location: Location,
    ) -> Self {
        Self {
            ephemeris,
            lunar,
            location,
        }
    }
}

impl SkyModel for EphemerisSky<'_> {
    fn core_position(&self, time: DateTime<Utc>) -> EphemerisResult<Horizontal> {
        self.ephemeris
            .horizontal_position(time, &self.location, &Equatorial::GALACTIC_CORE)
    }

    fn moon_position(&self, time: DateTime<Utc>) -> EphemerisResult<Horizontal> {
        self.lunar.moon_position(time, &self.location)
    }

    fn moon_illumination(&self, time: DateTime<Utc>) -> EphemerisResult<f64> {
        Ok(self.lunar.moon_illumination(time)?.fraction)
    }
}

/// Everything the scorer needs besides the sky itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringInputs {
    pub location: Location,
    pub night_start: Option<DateTime<Utc>>,
    pub night_end: Option<DateTime<Utc>>,
    pub core_rise: Option<DateTime<Utc>>,
    pub core_set: Option<DateTime<Utc>>,
}

/// Quality of one instant.
///
/// A Moon below the horizon leaves the sky dark (1.0). A Moon brighter than
/// [`BRIGHT_MOON_ILLUMINATION`] caps the score near zero wherever it is.
/// Otherwise a dim Moon costs less the farther it is from the core.
pub fn sample_score(moon_altitude: f64, illumination: f64, moon_angle: f64) -> f64 {
    let illumination = illumination.clamp(0.0, 1.0);
    let score = if moon_altitude <= 0.0 {
        1.0
    } else if illumination > BRIGHT_MOON_ILLUMINATION {
        (1.0 - illumination) * 0.2
    } else {
        (1.0 - illumination) * (moon_angle / FULL_SEPARATION_DEG).clamp(0.0, 1.0)
    };
    score.clamp(0.0, 1.0)
}

/// Length multiplier: `min_length_multiplier` at the minimum window, rising
/// linearly to 1.0 at `full_credit_minutes`.
pub fn length_multiplier(window_minutes: f64, settings: &ScoringSettings) -> f64 {
    let span = settings.full_credit_minutes - settings.min_window_minutes;
    if span <= 0.0 {
        return 1.0;
    }
    let progress = ((window_minutes - settings.min_window_minutes) / span).clamp(0.0, 1.0);
    settings.min_length_multiplier + (1.0 - settings.min_length_multiplier) * progress
}

/// Rating 1-4 from a window-adjusted score in [0, 1].
pub fn rating_bucket(score: f64) -> u8 {
    if score < 0.25 {
        1
    } else if score < 0.5 {
        2
    } else if score < 0.75 {
        3
    } else {
        4
    }
}

/// Sample offsets (minutes from the window start) and the weight each
/// carries: fine steps inside the edge segments, coarse steps in between.
pub fn sample_schedule(window_minutes: f64, settings: &ScoringSettings) -> Vec<(f64, f64)> {
    if window_minutes <= 0.0 {
        return Vec::new();
    }
    let edge = settings.edge_minutes.min(window_minutes / 2.0);
    let segments = [
        (0.0, edge, settings.edge_step_minutes),
        (edge, window_minutes - edge, settings.middle_step_minutes),
        (window_minutes - edge, window_minutes, settings.edge_step_minutes),
    ];

    let mut schedule = Vec::new();
    for (from, to, step) in segments {
        let length = to - from;
        if length <= 0.0 || step <= 0.0 {
            continue;
        }
        let count = (length / step).ceil() as usize;
        for i in 0..count {
            let offset = from + i as f64 * step;
            schedule.push((offset, step.min(to - offset)));
        }
    }
    schedule
}

/// Score the night of `inputs` against `sky`.
///
/// Early exits, in order: latitude beyond the cutoff, no astronomical night,
/// core never above threshold, and a night ∩ core window shorter than the
/// minimum. Each returns rating 0 and an empty curve.
pub fn compute_gc_observation_score(
    inputs: &ScoringInputs,
    sky: &dyn SkyModel,
    settings: &ScoringSettings,
) -> ObservationScore {
    if inputs.location.lat.abs() > settings.latitude_cutoff_deg {
        return ObservationScore::not_observable(REASON_LATITUDE);
    }
    let (Some(night_start), Some(night_end)) = (inputs.night_start, inputs.night_end) else {
        return ObservationScore::not_observable(REASON_NO_DARKNESS);
    };
    let (Some(core_rise), Some(core_set)) = (inputs.core_rise, inputs.core_set) else {
        return ObservationScore::not_observable(REASON_NO_RISE);
    };

    let window_start = night_start.max(core_rise);
    let window_end = night_end.min(core_set);
    let window_minutes = minutes_between(window_start, window_end);
    if window_minutes < settings.min_window_minutes {
        return ObservationScore::not_observable(format!(
            "Observation window too short (< {} minutes)",
            settings.min_window_minutes
        ));
    }

    let mut curve = Vec::new();
    let mut weighted_score = 0.0;
    let mut weighted_minutes = 0.0;
    let mut illumination_sum = 0.0;
    let mut moon_up = false;

    for (offset, weight) in sample_schedule(window_minutes, settings) {
        let time = add_minutes(window_start, offset);
        let (sample, illumination) = match score_instant(sky, time) {
            Ok(scored) => scored,
            Err(e) => {
                debug!("Skipping sample at {}: {}", time, e);
                continue;
            }
        };
        if sample.altitude_gc < settings.min_altitude_deg {
            continue;
        }
        weighted_score += sample.score * weight;
        weighted_minutes += weight;
        illumination_sum += illumination;
        moon_up |= sample.moon_altitude > 0.0;
        curve.push(sample);
    }

    if curve.is_empty() || weighted_minutes <= 0.0 {
        return ObservationScore {
            window_start: Some(window_start),
            window_end: Some(window_end),
            ..ObservationScore::not_observable(REASON_NO_SAMPLES)
        };
    }

    let average = weighted_score / weighted_minutes;
    let score = (average * length_multiplier(window_minutes, settings)).clamp(0.0, 1.0);
    let value = rating_bucket(score);
    let best_time = curve
        .iter()
        .fold(None::<&VisibilitySample>, |best, s| match best {
            Some(b) if b.score >= s.score => best,
            _ => Some(s),
        })
        .map(|s| s.time);

    let reason = select_reason(
        value,
        &ReasonContext {
            illumination: illumination_sum / curve.len() as f64,
            moon_up,
            window_minutes,
            score,
        },
    );

    debug!(
        "Scored {} samples between {} and {}: average={:.3} score={:.3} rating={}",
        curve.len(),
        window_start,
        window_end,
        average,
        score,
        value
    );

    ObservationScore {
        rating: Rating::new(value, reason),
        score,
        window_start: Some(window_start),
        window_end: Some(window_end),
        best_time,
        curve,
    }
}

fn score_instant(
    sky: &dyn SkyModel,
    time: DateTime<Utc>,
) -> EphemerisResult<(VisibilitySample, f64)> {
    let core = sky.core_position(time)?;
    let moon = sky.moon_position(time)?;
    let illumination = sky.moon_illumination(time)?;
    let moon_angle = core.separation(&moon);
    Ok((
        VisibilitySample {
            time,
            score: sample_score(moon.altitude, illumination, moon_angle),
            altitude_gc: core.altitude,
            moon_altitude: moon.altitude,
            moon_angle,
        },
        illumination,
    ))
}
