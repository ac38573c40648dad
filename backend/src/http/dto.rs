//! Data Transfer Objects for the HTTP API.
//!
//! Single-night responses reuse [`NightReport`] directly since it already
//! derives Serialize; the calendar returns a lighter summary per night.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlannerResult;
use crate::models::{Location, NightReport};

/// Query parameters for the single-night endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightQuery {
    /// Calendar date the night starts on (YYYY-MM-DD)
    pub date: NaiveDate,
    pub lat: f64,
    pub lng: f64,
    /// Elevation in meters (optional)
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl NightQuery {
    pub fn location(&self) -> PlannerResult<Location> {
        Location::with_elevation(self.lat, self.lng, self.elevation)
    }
}

/// Query parameters for the calendar endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    /// First night of the calendar (YYYY-MM-DD)
    pub start: NaiveDate,
    /// Number of nights (optional, default from configuration)
    #[serde(default)]
    pub nights: Option<u32>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl CalendarQuery {
    pub fn location(&self) -> PlannerResult<Location> {
        Location::with_elevation(self.lat, self.lng, self.elevation)
    }
}

/// One night of a calendar response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightSummary {
    pub date: NaiveDate,
    pub rating: u8,
    pub reason: String,
    pub stars: u8,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub best_time: Option<DateTime<Utc>>,
    pub moon_illumination: f64,
    pub dark_hours: f64,
}

impl From<&NightReport> for NightSummary {
    fn from(report: &NightReport) -> Self {
        Self {
            date: report.date,
            rating: report.rating.value,
            reason: report.rating.reason.clone(),
            stars: report.visibility_rating.stars,
            window_start: report.optimal_window.start_time,
            window_end: report.optimal_window.end_time,
            best_time: report.optimal_window.best_time,
            moon_illumination: report.moon.illumination,
            dark_hours: report.dark_hours,
        }
    }
}

/// Calendar response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub location: Location,
    /// Nights in date order
    pub nights: Vec<NightSummary>,
    /// Total count
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
}
