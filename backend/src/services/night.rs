//! Night planner: runs the locators, scorer, window synthesizer and rating
//! converter for one `(date, location)` or a run of consecutive nights.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use log::{debug, info};

use crate::config::PlannerConfig;
use crate::ephemeris::{
    CachedTimezone, EphemerisAdapter, LongitudeTimezone, LunarAdapter, SkyEphemeris,
    TimezoneAdapter, TimezoneCache,
};
use crate::error::{PlannerError, PlannerResult};
use crate::models::time::add_hours;
use crate::models::{
    GalacticCoreState, Location, LunarState, NightReport, ObservationScore, OptimalWindow,
};
use crate::services::galactic_core::locate_galactic_core;
use crate::services::lunar::locate_moon;
use crate::services::rating::{convert_visibility_rating, RatingInputs};
use crate::services::scorer::{compute_gc_observation_score, EphemerisSky, ScoringInputs};
use crate::services::twilight::{calculate_dark_duration, locate_night};
use crate::services::window::find_optimal_window;

/// Stateless apart from its adapters, so one planner can serve many
/// requests concurrently.
#[derive(Clone)]
pub struct NightPlanner {
    ephemeris: Arc<dyn EphemerisAdapter>,
    lunar: Arc<dyn LunarAdapter>,
    timezone: Arc<dyn TimezoneAdapter>,
    config: PlannerConfig,
}

impl NightPlanner {
    pub fn new(
        ephemeris: Arc<dyn EphemerisAdapter>,
        lunar: Arc<dyn LunarAdapter>,
        timezone: Arc<dyn TimezoneAdapter>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            ephemeris,
            lunar,
            timezone,
            config,
        }
    }

    /// Bundled ephemeris for night, Moon and core, with longitude-derived
    /// timezones memoized in a fresh cache.
    pub fn with_defaults(config: PlannerConfig) -> Self {
        let sky = Arc::new(SkyEphemeris::new());
        let timezone = CachedTimezone::new(LongitudeTimezone, Arc::new(TimezoneCache::new()));
        Self::new(sky.clone(), sky, Arc::new(timezone), config)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Full report for the night that starts on `date`.
    pub fn plan_night(&self, date: NaiveDate, location: &Location) -> NightReport {
        let reference = location.local_noon(date);
        let galactic_core = locate_galactic_core(self.ephemeris.as_ref(), reference, location);
        let night_window = locate_night(self.ephemeris.as_ref(), date, location);

        let moon_at = night_window
            .bounds()
            .map(|(dusk, dawn)| dusk + (dawn - dusk) / 2)
            .unwrap_or_else(|| add_hours(reference, 12.0));
        let moon = locate_moon(self.lunar.as_ref(), date, moon_at, location);

        let pass = galactic_core.pass_for_night(&night_window);
        let inputs = ScoringInputs {
            location: *location,
            night_start: night_window.night,
            night_end: night_window.day_end,
            core_rise: pass.map(|p| p.rise),
            core_set: pass.map(|p| p.set),
        };
        let sky = EphemerisSky::new(self.ephemeris.as_ref(), self.lunar.as_ref(), *location);
        let observation = compute_gc_observation_score(&inputs, &sky, &self.config.scoring);

        let optimal_window = if observation.rating.value == 0 {
            OptimalWindow::empty(observation.rating.reason.clone())
        } else {
            find_optimal_window(
                &observation.curve,
                &self.config.window,
                self.config.scoring.max_sample_spacing_minutes(),
            )
        };

        let dark_hours = calculate_dark_duration(&night_window).unwrap_or(0.0);
        let rating_inputs = rating_inputs(
            &observation,
            &optimal_window,
            &moon,
            &galactic_core,
            dark_hours,
        );
        let visibility_rating = convert_visibility_rating(
            &rating_inputs,
            &optimal_window,
            location,
            self.timezone.as_ref(),
        );

        debug!(
            "Planned {} at ({}, {}): rating={} stars={}",
            date,
            location.lat,
            location.lng,
            observation.rating.value,
            visibility_rating.stars
        );

        NightReport {
            date,
            location: *location,
            galactic_core,
            moon,
            night_window,
            dark_hours,
            rating: observation.rating.clone(),
            observation,
            optimal_window,
            visibility_rating,
        }
    }

    /// Reports for `nights` consecutive nights starting on `start`, in date
    /// order.
    pub fn plan_calendar(
        &self,
        start: NaiveDate,
        nights: u32,
        location: &Location,
    ) -> PlannerResult<Vec<NightReport>> {
        let dates = calendar_dates(start, nights, self.config.calendar.max_nights)?;
        info!(
            "Planning {} nights from {} at ({}, {})",
            dates.len(),
            start,
            location.lat,
            location.lng
        );
        Ok(dates
            .into_iter()
            .map(|date| self.plan_night(date, location))
            .collect())
    }
}

/// The `nights` dates starting at `start`, validated against `max_nights`.
pub fn calendar_dates(
    start: NaiveDate,
    nights: u32,
    max_nights: u32,
) -> PlannerResult<Vec<NaiveDate>> {
    if nights == 0 || nights > max_nights {
        return Err(PlannerError::invalid_date(format!(
            "nights must be between 1 and {}",
            max_nights
        )));
    }
    (0..nights)
        .map(|offset| {
            start
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| {
                    PlannerError::invalid_date("Calendar extends past the supported date range")
                })
        })
        .collect()
}

fn rating_inputs(
    observation: &ObservationScore,
    window: &OptimalWindow,
    moon: &LunarState,
    galactic_core: &GalacticCoreState,
    dark_hours: f64,
) -> RatingInputs {
    let peak_altitude = observation
        .curve
        .iter()
        .map(|s| s.altitude_gc)
        .fold(None::<f64>, |peak, alt| Some(peak.map_or(alt, |p| p.max(alt))))
        .unwrap_or(galactic_core.altitude);

    let moon_altitude = window
        .best_time
        .and_then(|best| observation.curve.iter().find(|s| s.time == best))
        .map(|s| s.moon_altitude)
        .unwrap_or(moon.altitude);

    RatingInputs {
        core_altitude: peak_altitude,
        moon_altitude,
        moon_illumination: moon.illumination,
        dark_hours,
    }
}
