//! Service layer for the planning pipeline.
//!
//! Locators turn adapter output into value objects, the scorer and window
//! synthesizer turn those into a recommendation, and [`NightPlanner`] runs
//! the whole chain for a date and location.

pub mod galactic_core;
pub mod lunar;
pub mod night;
pub mod rating;
pub mod reasons;
pub mod scorer;
pub mod twilight;
pub mod window;

pub use galactic_core::{altitude_threshold, locate_galactic_core};
pub use lunar::locate_moon;
pub use night::{calendar_dates, NightPlanner};
pub use rating::{convert_visibility_rating, RatingInputs};
pub use scorer::{compute_gc_observation_score, EphemerisSky, ScoringInputs, SkyModel};
pub use twilight::{calculate_dark_duration, locate_night};
pub use window::{find_optimal_window, find_quality_periods};
