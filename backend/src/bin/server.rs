//! Galactic core planner HTTP server.
//!
//! Loads the planner configuration, builds the router and starts serving
//! requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gc-planner-server
//!
//! # Different port and a stricter window threshold
//! PORT=9000 GC_QUALITY_THRESHOLD=0.5 cargo run --bin gc-planner-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `GC_QUALITY_THRESHOLD`: Window synthesizer threshold (default: 0.4)
//! - `GC_CALENDAR_NIGHTS`: Default calendar length (default: 7)
//! - `RUST_LOG`: Log level (default: info)
//!
//! Settings can also come from a `planner.toml` in the working directory,
//! `backend/` or the parent directory; environment variables win.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gc_planner::config::PlannerConfig;
use gc_planner::http::{create_router, AppState};
use gc_planner::services::NightPlanner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting galactic core planner server");

    let config = PlannerConfig::load()?;
    info!(
        "Configuration loaded: quality threshold {}, {} calendar nights",
        config.window.quality_threshold, config.calendar.default_nights
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let planner = Arc::new(NightPlanner::with_defaults(config));
    let app = create_router(AppState::new(planner));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
