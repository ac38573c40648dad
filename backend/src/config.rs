//! Planner configuration file support.
//!
//! Configuration is read from a TOML file (`planner.toml`) with every field
//! optional; missing values fall back to the built-in defaults. A handful of
//! environment variables can override the file for deployments.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, PlannerError, PlannerResult};

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Observation scorer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Beyond this absolute latitude the core never clears the horizon usefully
    #[serde(default = "default_latitude_cutoff")]
    pub latitude_cutoff_deg: f64,
    /// Samples below this core altitude are not scored
    #[serde(default = "default_min_altitude")]
    pub min_altitude_deg: f64,
    /// Shortest night ∩ core window worth scoring
    #[serde(default = "default_min_window_minutes")]
    pub min_window_minutes: f64,
    /// Length of the finely sampled segment at each window edge
    #[serde(default = "default_edge_minutes")]
    pub edge_minutes: f64,
    #[serde(default = "default_edge_step_minutes")]
    pub edge_step_minutes: f64,
    #[serde(default = "default_middle_step_minutes")]
    pub middle_step_minutes: f64,
    /// Window length that earns the full length multiplier
    #[serde(default = "default_full_credit_minutes")]
    pub full_credit_minutes: f64,
    /// Length multiplier applied to a window of `min_window_minutes`
    #[serde(default = "default_min_length_multiplier")]
    pub min_length_multiplier: f64,
}

/// Window synthesizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Samples at or above this score form quality periods
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    /// Quality periods shorter than this are discarded
    #[serde(default = "default_min_period_minutes")]
    pub min_period_minutes: f64,
}

/// Multi-night calendar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    #[serde(default = "default_calendar_nights")]
    pub default_nights: u32,
    #[serde(default = "default_max_calendar_nights")]
    pub max_nights: u32,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_latitude_cutoff() -> f64 {
    61.0
}

fn default_min_altitude() -> f64 {
    15.0
}

fn default_min_window_minutes() -> f64 {
    30.0
}

fn default_edge_minutes() -> f64 {
    30.0
}

fn default_edge_step_minutes() -> f64 {
    2.0
}

fn default_middle_step_minutes() -> f64 {
    8.0
}

fn default_full_credit_minutes() -> f64 {
    120.0
}

fn default_min_length_multiplier() -> f64 {
    0.7
}

fn default_quality_threshold() -> f64 {
    0.4
}

fn default_min_period_minutes() -> f64 {
    15.0
}

fn default_calendar_nights() -> u32 {
    7
}

fn default_max_calendar_nights() -> u32 {
    31
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            latitude_cutoff_deg: default_latitude_cutoff(),
            min_altitude_deg: default_min_altitude(),
            min_window_minutes: default_min_window_minutes(),
            edge_minutes: default_edge_minutes(),
            edge_step_minutes: default_edge_step_minutes(),
            middle_step_minutes: default_middle_step_minutes(),
            full_credit_minutes: default_full_credit_minutes(),
            min_length_multiplier: default_min_length_multiplier(),
        }
    }
}

impl ScoringSettings {
    /// Largest spacing between consecutive samples of one scored window.
    pub fn max_sample_spacing_minutes(&self) -> f64 {
        self.edge_step_minutes.max(self.middle_step_minutes)
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            min_period_minutes: default_min_period_minutes(),
        }
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            default_nights: default_calendar_nights(),
            max_nights: default_max_calendar_nights(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` if the file was read, parsed and validated
    /// * `Err(PlannerError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_config").with_details(path.display().to_string());

        let content = fs::read_to_string(path).map_err(|e| {
            PlannerError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                context(),
            )
        })?;

        let config: PlannerConfig = toml::from_str(&content).map_err(|e| {
            PlannerError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                context(),
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `planner.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PlannerResult<Self> {
        let search_paths = [
            PathBuf::from("planner.toml"),
            PathBuf::from("backend/planner.toml"),
            PathBuf::from("../planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PlannerError::configuration(
            "No planner.toml found in standard locations",
        ))
    }

    /// File configuration when one exists, defaults otherwise; environment
    /// overrides are applied on top.
    pub fn load() -> PlannerResult<Self> {
        let mut config = match Self::from_default_location() {
            Ok(config) => config,
            Err(PlannerError::Configuration { ref message, .. })
                if message.starts_with("No planner.toml") =>
            {
                log::debug!("No planner.toml found, using built-in defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// # Environment Variables
    /// - `HOST` (optional): Server host
    /// - `PORT` (optional): Server port
    /// - `GC_QUALITY_THRESHOLD` (optional): Window synthesizer threshold
    /// - `GC_CALENDAR_NIGHTS` (optional): Default number of calendar nights
    pub fn apply_env_overrides(&mut self) -> PlannerResult<()> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| PlannerError::configuration("PORT must be a valid port number"))?;
        }
        if let Ok(threshold) = env::var("GC_QUALITY_THRESHOLD") {
            self.window.quality_threshold = threshold.parse().map_err(|_| {
                PlannerError::configuration("GC_QUALITY_THRESHOLD must be a number")
            })?;
        }
        if let Ok(nights) = env::var("GC_CALENDAR_NIGHTS") {
            self.calendar.default_nights = nights.parse().map_err(|_| {
                PlannerError::configuration("GC_CALENDAR_NIGHTS must be a positive integer")
            })?;
        }
        self.validate()
    }

    /// Check value ranges.
    pub fn validate(&self) -> PlannerResult<()> {
        let s = &self.scoring;
        if !(0.0..=90.0).contains(&s.latitude_cutoff_deg) {
            return Err(PlannerError::configuration(
                "scoring.latitude_cutoff_deg must be within [0, 90]",
            ));
        }
        if !(-90.0..=90.0).contains(&s.min_altitude_deg) {
            return Err(PlannerError::configuration(
                "scoring.min_altitude_deg must be within [-90, 90]",
            ));
        }
        for (name, value) in [
            ("scoring.edge_step_minutes", s.edge_step_minutes),
            ("scoring.middle_step_minutes", s.middle_step_minutes),
            ("scoring.min_window_minutes", s.min_window_minutes),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::configuration(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        if !(s.edge_minutes.is_finite() && s.edge_minutes >= 0.0) {
            return Err(PlannerError::configuration(
                "scoring.edge_minutes must not be negative",
            ));
        }
        if s.full_credit_minutes < s.min_window_minutes {
            return Err(PlannerError::configuration(
                "scoring.full_credit_minutes must be at least scoring.min_window_minutes",
            ));
        }
        if !(0.0..=1.0).contains(&s.min_length_multiplier) {
            return Err(PlannerError::configuration(
                "scoring.min_length_multiplier must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.window.quality_threshold) {
            return Err(PlannerError::configuration(
                "window.quality_threshold must be within [0, 1]",
            ));
        }
        if !(self.window.min_period_minutes.is_finite() && self.window.min_period_minutes >= 0.0) {
            return Err(PlannerError::configuration(
                "window.min_period_minutes must not be negative",
            ));
        }
        if self.calendar.default_nights == 0
            || self.calendar.default_nights > self.calendar.max_nights
        {
            return Err(PlannerError::configuration(
                "calendar.default_nights must be between 1 and calendar.max_nights",
            ));
        }
        Ok(())
    }
}
