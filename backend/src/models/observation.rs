//! Scoring and recommendation outputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::location::Location;
use crate::models::sky::{GalacticCoreState, LunarState, NightWindow};

/// One evaluation point of the observation quality function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilitySample {
    pub time: DateTime<Utc>,
    /// Quality in [0, 1]
    pub score: f64,
    #[serde(rename = "altitudeGC")]
    pub altitude_gc: f64,
    pub moon_altitude: f64,
    /// Angular separation between Moon and core, degrees
    pub moon_angle: f64,
}

/// Descriptive label for an average quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maximal contiguous run of the quality curve at or above a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Length in hours
    pub duration: f64,
    pub average_score: f64,
    pub quality: QualityLabel,
}

/// The recommended observation interval for a night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalWindow {
    /// `None` means no viable window
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Length in hours
    pub duration: f64,
    pub average_score: f64,
    pub best_time: Option<DateTime<Utc>>,
    pub quality_periods: Vec<QualityPeriod>,
    pub description: String,
}

impl OptimalWindow {
    /// A window that recommends nothing.
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            start_time: None,
            end_time: None,
            duration: 0.0,
            average_score: 0.0,
            best_time: None,
            quality_periods: Vec::new(),
            description: description.into(),
        }
    }

    pub fn is_viable(&self) -> bool {
        self.start_time.is_some() && self.duration > 0.0
    }
}

/// Coarse 0-4 star rating with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub value: u8,
    pub reason: String,
}

impl Rating {
    pub const MAX: u8 = 4;

    pub fn new(value: u8, reason: impl Into<String>) -> Self {
        Self {
            value: value.min(Self::MAX),
            reason: reason.into(),
        }
    }

    pub fn zero(reason: impl Into<String>) -> Self {
        Self::new(0, reason)
    }
}

/// Output of the observation scorer for one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationScore {
    pub rating: Rating,
    /// Window-adjusted score in [0, 1]; zero on early exits
    pub score: f64,
    /// Scored window (night ∩ core-visible), when one exists
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    /// Highest-scoring sample of the curve
    pub best_time: Option<DateTime<Utc>>,
    pub curve: Vec<VisibilitySample>,
}

impl ObservationScore {
    /// Rating-0 outcome with no curve.
    pub fn not_observable(reason: impl Into<String>) -> Self {
        Self {
            rating: Rating::zero(reason),
            score: 0.0,
            window_start: None,
            window_end: None,
            best_time: None,
            curve: Vec::new(),
        }
    }
}

/// Point-based rating with the contributions that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRating {
    pub stars: u8,
    pub altitude_points: f64,
    pub moon_penalty: f64,
    pub darkness_points: f64,
    pub total_points: f64,
}

/// Full result for one `(date, location)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightReport {
    pub date: NaiveDate,
    pub location: Location,
    pub galactic_core: GalacticCoreState,
    pub moon: LunarState,
    pub night_window: NightWindow,
    /// Hours of astronomical darkness, zero when there is none
    pub dark_hours: f64,
    pub observation: ObservationScore,
    pub optimal_window: OptimalWindow,
    pub rating: Rating,
    pub visibility_rating: VisibilityRating,
}
