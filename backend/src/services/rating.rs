//! Point-based visibility rating.
//!
//! Independent of the scorer's 0-4 rating: altitude and darkness earn points,
//! a lit Moon above the horizon costs points, and the total maps to stars.
//! Windows that start in local daytime are rated zero.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::ephemeris::{LongitudeTimezone, TimezoneAdapter};
use crate::models::{Location, OptimalWindow, VisibilityRating};

pub const MAX_ALTITUDE_POINTS: f64 = 50.0;
pub const POINTS_PER_DEGREE: f64 = 1.5;
pub const MAX_MOON_PENALTY: f64 = 30.0;
/// Moon altitude at which interference saturates.
pub const MOON_SATURATION_ALTITUDE: f64 = 45.0;
pub const MOON_ALTITUDE_EXPONENT: f64 = 0.7;
/// `(minimum dark hours, points)`, best bucket first.
pub const DARKNESS_BUCKETS: [(f64, f64); 4] = [(8.0, 30.0), (6.0, 25.0), (4.0, 20.0), (2.0, 10.0)];
/// Local hours treated as daytime, `[start, end)`.
pub const DAYTIME_HOURS: (u32, u32) = (6, 18);

/// Sky conditions fed to the converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingInputs {
    pub core_altitude: f64,
    pub moon_altitude: f64,
    pub moon_illumination: f64,
    pub dark_hours: f64,
}

pub fn altitude_points(core_altitude: f64) -> f64 {
    (core_altitude.max(0.0) * POINTS_PER_DEGREE).min(MAX_ALTITUDE_POINTS)
}

/// Penalty for moonlight; zero while the Moon is down.
pub fn moon_penalty(moon_altitude: f64, illumination: f64) -> f64 {
    if moon_altitude <= 0.0 {
        return 0.0;
    }
    let height = (moon_altitude / MOON_SATURATION_ALTITUDE)
        .powf(MOON_ALTITUDE_EXPONENT)
        .min(1.0);
    MAX_MOON_PENALTY * illumination.clamp(0.0, 1.0) * height
}

pub fn darkness_points(dark_hours: f64) -> f64 {
    DARKNESS_BUCKETS
        .iter()
        .find(|(hours, _)| dark_hours >= *hours)
        .map_or(0.0, |(_, points)| *points)
}

/// Stars for a rateable window; never zero.
pub fn stars_from_points(points: f64) -> u8 {
    if points >= 60.0 {
        4
    } else if points >= 45.0 {
        3
    } else if points >= 25.0 {
        2
    } else {
        1
    }
}

/// Rate a night from its conditions and recommended window.
pub fn convert_visibility_rating(
    inputs: &RatingInputs,
    window: &OptimalWindow,
    location: &Location,
    timezone: &dyn TimezoneAdapter,
) -> VisibilityRating {
    let start = match window.start_time {
        Some(start) if window.duration > 0.0 => start,
        _ => return VisibilityRating::default(),
    };
    if starts_in_daytime(start, location, timezone) {
        debug!("Window starting {} falls in local daytime, rating zero", start);
        return VisibilityRating::default();
    }

    let altitude = altitude_points(inputs.core_altitude);
    let penalty = moon_penalty(inputs.moon_altitude, inputs.moon_illumination);
    let darkness = darkness_points(inputs.dark_hours);
    let total = (altitude - penalty + darkness).max(0.0);

    VisibilityRating {
        stars: stars_from_points(total),
        altitude_points: altitude,
        moon_penalty: penalty,
        darkness_points: darkness,
        total_points: total,
    }
}

fn starts_in_daytime(
    start: DateTime<Utc>,
    location: &Location,
    timezone: &dyn TimezoneAdapter,
) -> bool {
    let hour = timezone.local_hour(start, location).or_else(|e| {
        warn!("Timezone lookup failed, using longitude offset: {}", e);
        LongitudeTimezone.local_hour(start, location)
    });
    match hour {
        Ok(hour) => (DAYTIME_HOURS.0..DAYTIME_HOURS.1).contains(&hour),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{EphemerisResult, FixedOffsetTimezone};
    use crate::error::EphemerisError;
    use chrono::{FixedOffset, TimeZone};

    struct FailingTimezone;

    impl TimezoneAdapter for FailingTimezone {
        fn utc_offset(&self, _t: DateTime<Utc>, _l: &Location) -> EphemerisResult<FixedOffset> {
            Err(EphemerisError::Unavailable("lookup down".into()))
        }
    }

    fn window(start: DateTime<Utc>) -> OptimalWindow {
        OptimalWindow {
            start_time: Some(start),
            end_time: Some(start + chrono::Duration::hours(3)),
            duration: 3.0,
            ..OptimalWindow::empty("test")
        }
    }

    fn clear_night() -> RatingInputs {
        RatingInputs {
            core_altitude: 40.0,
            moon_altitude: -10.0,
            moon_illumination: 0.9,
            dark_hours: 7.0,
        }
    }

    #[test]
    fn test_point_components() {
        assert_eq!(altitude_points(-5.0), 0.0);
        assert_eq!(altitude_points(20.0), 30.0);
        assert_eq!(altitude_points(60.0), 50.0);
        assert_eq!(moon_penalty(-1.0, 1.0), 0.0);
        assert_eq!(moon_penalty(45.0, 1.0), 30.0);
        assert_eq!(moon_penalty(80.0, 0.5), 15.0);
        let low = moon_penalty(10.0, 1.0);
        assert!(low > 5.0 && low < 30.0, "penalty {}", low);
        assert_eq!(darkness_points(1.5), 0.0);
        assert_eq!(darkness_points(3.0), 10.0);
        assert_eq!(darkness_points(4.0), 20.0);
        assert_eq!(darkness_points(7.0), 25.0);
        assert_eq!(darkness_points(10.0), 30.0);
    }

    #[test]
    fn test_star_thresholds() {
        assert_eq!(stars_from_points(0.0), 1);
        assert_eq!(stars_from_points(10.0), 1);
        assert_eq!(stars_from_points(25.0), 2);
        assert_eq!(stars_from_points(45.0), 3);
        assert_eq!(stars_from_points(59.9), 3);
        assert_eq!(stars_from_points(60.0), 4);
    }

    #[test]
    fn test_dark_night_gets_four_stars() {
        let loc = Location::new(34.0, -116.0).unwrap();
        let tz = FixedOffsetTimezone::from_minutes(-420).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 7, 16, 5, 0, 0).unwrap();
        let rating = convert_visibility_rating(&clear_night(), &window(start), &loc, &tz);
        assert_eq!(rating.stars, 4);
        assert_eq!(rating.total_points, 75.0);
    }

    #[test]
    fn test_daytime_window_is_zero() {
        let loc = Location::new(34.0, -116.0).unwrap();
        let tz = FixedOffsetTimezone::from_minutes(-420).unwrap();
        // 20:00 UTC is 13:00 at UTC-7.
        let start = Utc.with_ymd_and_hms(2024, 7, 16, 20, 0, 0).unwrap();
        let rating = convert_visibility_rating(&clear_night(), &window(start), &loc, &tz);
        assert_eq!(rating, VisibilityRating::default());
    }

    #[test]
    fn test_timezone_failure_falls_back_to_longitude() {
        let loc = Location::new(34.0, -116.0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 7, 16, 20, 0, 0).unwrap();
        let rating =
            convert_visibility_rating(&clear_night(), &window(start), &loc, &FailingTimezone);
        assert_eq!(rating.stars, 0);

        let night_start = Utc.with_ymd_and_hms(2024, 7, 16, 6, 0, 0).unwrap();
        let rating =
            convert_visibility_rating(&clear_night(), &window(night_start), &loc, &FailingTimezone);
        assert_eq!(rating.stars, 4);
    }

    #[test]
    fn test_missing_window_is_zero() {
        let loc = Location::new(34.0, -116.0).unwrap();
        let rating = convert_visibility_rating(
            &clear_night(),
            &OptimalWindow::empty("none"),
            &loc,
            &LongitudeTimezone,
        );
        assert_eq!(rating.stars, 0);
    }
}
