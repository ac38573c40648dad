//! HTTP server module for the planner.
//!
//! Exposes the [`NightPlanner`](crate::services::NightPlanner) as a small
//! read-only REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing and validation                           │
//! │  - JSON serialization                                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ spawn_blocking
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (NightPlanner)                             │
//! │  - Locators, scorer, window synthesizer, rating           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Ephemeris adapters (siderust, lunar series, tz cache)    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
