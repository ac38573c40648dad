//! End-to-end planning with the bundled ephemeris.

mod support;

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use gc_planner::config::PlannerConfig;
use gc_planner::ephemeris::LongitudeTimezone;
use gc_planner::error::PlannerError;
use gc_planner::models::{Location, LunarState, NightReport};
use gc_planner::services::NightPlanner;
use proptest::prelude::*;
use support::{date, joshua_tree, OfflineEphemeris};

fn planner() -> NightPlanner {
    NightPlanner::with_defaults(PlannerConfig::default())
}

fn siding_spring() -> Location {
    Location::with_elevation(-31.27, 149.06, Some(1165.0)).unwrap()
}

/// Invariants every report must satisfy.
fn assert_report_consistent(report: &NightReport) {
    let core = &report.galactic_core;
    if let (Some(rise), Some(set)) = (core.rise_time, core.set_time) {
        assert!(rise < set, "core rise {} not before set {}", rise, set);
    }
    if let (Some(dusk), Some(dawn)) = (report.night_window.night, report.night_window.day_end) {
        assert!(dusk < dawn, "dusk {} not before dawn {}", dusk, dawn);
        assert!(report.dark_hours > 0.0);
    }

    let observation = &report.observation;
    assert!(observation.rating.value <= 4);
    assert_eq!(report.rating, observation.rating);
    assert!(observation.curve.windows(2).all(|w| w[0].time < w[1].time));
    assert!(observation.curve.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    assert!(observation.curve.iter().all(|s| s.altitude_gc >= 15.0));

    if observation.rating.value == 0 {
        assert!(observation.curve.is_empty());
        assert!(!report.optimal_window.is_viable());
        assert_eq!(report.visibility_rating.stars, 0);
    }

    let window = &report.optimal_window;
    if window.is_viable() {
        let (start, end) = (window.start_time.unwrap(), window.end_time.unwrap());
        assert!(start >= observation.window_start.unwrap());
        assert!(end <= observation.window_end.unwrap());
        let best = window.best_time.unwrap();
        assert!(best >= start && best <= end);
    }
    assert!(report.visibility_rating.stars <= 4);
}

#[test]
fn test_joshua_tree_summer_night() {
    let report = planner().plan_night(date(2024, 7, 15), &joshua_tree());
    assert_report_consistent(&report);
    assert!(report.night_window.night.is_some());
    assert!(report.galactic_core.rise_time.is_some());
    assert_eq!(report.galactic_core.threshold.value(), 20.0);
}

#[test]
fn test_new_moon_beats_full_moon() {
    let planner = planner();
    // New moon 2024-06-06, full moon in Sagittarius 2024-06-22.
    let dark = planner.plan_night(date(2024, 6, 6), &siding_spring());
    let bright = planner.plan_night(date(2024, 6, 21), &siding_spring());
    assert_report_consistent(&dark);
    assert_report_consistent(&bright);

    assert!(dark.rating.value >= 3, "new moon rating {}", dark.rating.value);
    assert!(bright.rating.value <= 2, "full moon rating {}", bright.rating.value);
    assert!(dark.rating.value > bright.rating.value);
    assert!(dark.moon.illumination < 0.05);
    assert!(bright.moon.illumination > 0.95);
    assert!(dark.optimal_window.is_viable());
}

#[test]
fn test_far_north_report() {
    let report = planner().plan_night(date(2024, 7, 15), &Location::new(65.0, 25.0).unwrap());
    assert_eq!(report.rating.value, 0);
    assert_eq!(
        report.rating.reason,
        "Galactic Center never visible at this latitude"
    );
    assert!(report.observation.curve.is_empty());
}

#[test]
fn test_offline_ephemeris_degrades_to_not_observable() {
    let offline = Arc::new(OfflineEphemeris);
    let planner = NightPlanner::new(
        offline.clone(),
        offline,
        Arc::new(LongitudeTimezone),
        PlannerConfig::default(),
    );
    let report = planner.plan_night(date(2024, 7, 15), &joshua_tree());

    assert_eq!(report.rating.value, 0);
    assert_eq!(report.rating.reason, "No astronomical darkness tonight");
    assert!(report.galactic_core.rise_time.is_none());
    assert_eq!(report.moon, LunarState::default());
    assert_eq!(report.dark_hours, 0.0);
}

#[test]
fn test_calendar_is_ordered_and_bounded() {
    let planner = planner();
    let start = date(2024, 8, 1);
    let reports = planner.plan_calendar(start, 5, &joshua_tree()).unwrap();

    assert_eq!(reports.len(), 5);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.date, start.checked_add_days(Days::new(i as u64)).unwrap());
        assert_report_consistent(report);
    }

    let err = planner.plan_calendar(start, 0, &joshua_tree()).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidDate { .. }));
    assert!(planner.plan_calendar(start, 32, &joshua_tree()).is_err());
}

#[test]
fn test_reports_are_deterministic() {
    let planner = planner();
    let a = planner.plan_night(date(2024, 8, 10), &siding_spring());
    let b = planner.plan_night(date(2024, 8, 10), &siding_spring());
    assert_eq!(a, b);
}

#[test]
fn test_report_serializes_with_camel_case_fields() {
    let report = planner().plan_night(date(2024, 6, 6), &siding_spring());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("galacticCore").is_some());
    assert!(json["optimalWindow"].get("qualityPeriods").is_some());
    assert!(json["galacticCore"].get("riseTime").is_some());
    if let Some(sample) = json["observation"]["curve"].get(0) {
        assert!(sample.get("altitudeGC").is_some());
        assert!(sample.get("moonAngle").is_some());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_reports_hold_invariants(
        lat in -60.0..60.0f64,
        lng in -180.0..180.0f64,
        day in 0u64..3650,
    ) {
        let location = Location::new(lat, lng).unwrap();
        let night = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Days::new(day);
        let report = planner().plan_night(night, &location);
        assert_report_consistent(&report);
    }
}
