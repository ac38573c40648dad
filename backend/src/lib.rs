//! # Galactic Core Planner
//!
//! Night-by-night planning for Milky Way core photography.
//!
//! For a date and an observer location the planner works out when the
//! galactic core clears a useful altitude, when astronomical darkness begins
//! and ends, where the Moon is and how bright it is. It then scores the
//! overlap and recommends an observation window with a 0-4 star rating.
//!
//! ## Features
//!
//! - **Ephemeris**: Low-precision Sun, Moon and fixed-star positions behind
//!   swappable adapter traits
//! - **Locators**: Core rise/transit/set, moonrise/moonset and phase,
//!   astronomical dusk and dawn
//! - **Scoring**: Sampled quality curve, window-adjusted score and rating
//!   with a human-readable reason
//! - **Windows**: Best contiguous high-quality period of the night
//! - **HTTP API**: Single-night and calendar endpoints via Axum
//!
//! ## Architecture
//!
//! - [`models`]: Value objects (locations, sky states, scores, reports)
//! - [`ephemeris`]: Adapter contracts and the bundled siderust-backed implementation
//! - [`services`]: Locators, scorer, window synthesizer and [`services::NightPlanner`]
//! - [`config`]: TOML and environment configuration
//! - [`error`]: Error types shared across the crate
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use gc_planner::config::PlannerConfig;
//! use gc_planner::models::Location;
//! use gc_planner::services::NightPlanner;
//!
//! let planner = NightPlanner::with_defaults(PlannerConfig::default());
//! let joshua_tree = Location::new(34.0, -116.0).unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
//!
//! let report = planner.plan_night(date, &joshua_tree);
//! assert!(report.rating.value <= 4);
//! ```

pub mod config;
pub mod ephemeris;
pub mod error;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
pub use services::NightPlanner;
