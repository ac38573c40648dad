//! HTTP handlers for the REST API.
//!
//! Each handler validates its query and delegates to the [`NightPlanner`].
//! Planning is CPU-bound, so it runs on the blocking pool.
//!
//! [`NightPlanner`]: crate::services::NightPlanner

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use log::info;

use super::dto::{CalendarQuery, CalendarResponse, HealthResponse, NightQuery, NightSummary};
use super::error::AppError;
use super::state::AppState;
use crate::models::NightReport;
use crate::services::calendar_dates;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
    }))
}

// =============================================================================
// Planning Endpoints
// =============================================================================

/// GET /v1/night?date=YYYY-MM-DD&lat=..&lng=..[&elevation=..]
///
/// Full report for a single night.
pub async fn get_night(
    State(state): State<AppState>,
    query: Result<Query<NightQuery>, QueryRejection>,
) -> HandlerResult<NightReport> {
    let Query(query) = query?;
    let location = query.location()?;
    let date = query.date;

    let planner = state.planner.clone();
    let report = tokio::task::spawn_blocking(move || planner.plan_night(date, &location)).await?;

    Ok(Json(report))
}

/// GET /v1/calendar?start=YYYY-MM-DD&lat=..&lng=..[&nights=..]
///
/// One summary per night, planned concurrently and returned in date order.
pub async fn get_calendar(
    State(state): State<AppState>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> HandlerResult<CalendarResponse> {
    let Query(query) = query?;
    let location = query.location()?;
    let calendar = &state.planner.config().calendar;
    let nights = query.nights.unwrap_or(calendar.default_nights);
    let dates = calendar_dates(query.start, nights, calendar.max_nights)?;

    info!(
        "Calendar request: {} nights from {} at ({}, {})",
        dates.len(),
        query.start,
        location.lat,
        location.lng
    );

    let handles: Vec<_> = dates
        .into_iter()
        .map(|date| {
            let planner = state.planner.clone();
            tokio::task::spawn_blocking(move || planner.plan_night(date, &location))
        })
        .collect();

    let mut summaries = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle.await?;
        summaries.push(NightSummary::from(&report));
    }
    summaries.sort_by_key(|s| s.date);

    let total = summaries.len();
    Ok(Json(CalendarResponse {
        location,
        nights: summaries,
        total,
    }))
}
