use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::models::time::add_hours;

/// Observer location (latitude, longitude, optional elevation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180), east positive
    pub lng: f64,
    /// Elevation in meters above sea level (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> PlannerResult<Self> {
        Self::with_elevation(lat, lng, None)
    }

    pub fn with_elevation(lat: f64, lng: f64, elevation_m: Option<f64>) -> PlannerResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(PlannerError::invalid_location(
                "Latitude must be between -90 and 90 degrees",
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(PlannerError::invalid_location(
                "Longitude must be between -180 and 180 degrees",
            ));
        }
        if let Some(elevation) = elevation_m {
            if !elevation.is_finite() {
                return Err(PlannerError::invalid_location("Elevation must be finite"));
            }
        }
        Ok(Self {
            lat,
            lng,
            elevation_m,
        })
    }

    /// Elevation in meters, zero when unknown.
    pub fn elevation(&self) -> f64 {
        self.elevation_m.unwrap_or(0.0)
    }

    /// Mean-solar offset from UTC in hours (`lng / 15`).
    pub fn solar_offset_hours(&self) -> f64 {
        self.lng / 15.0
    }

    /// Approximate local midnight that starts `date`, expressed in UTC.
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let utc_midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        add_hours(utc_midnight, -self.solar_offset_hours())
    }

    /// Approximate local noon of `date`, expressed in UTC.
    pub fn local_noon(&self, date: NaiveDate) -> DateTime<Utc> {
        add_hours(self.local_midnight(date), 12.0)
    }
}
