//! "This day in past years" views for a Reitti location-tracking server.
//!
//! Two pipelines share this crate:
//!
//! - GPX path overlay: [`fetch_year_paths`] → [`parse_gpx_coordinates`] →
//!   [`write_overlay`], one Leaflet map with a polyline per year.
//! - Screenshot collage: [`ChromeSession`] → [`capture_days`] → [`write_collage`], one grid
//!   image of the day view across years.
#![forbid(unsafe_code)]

pub mod browser;
pub mod collage;
pub mod config;
pub mod fetch;
pub mod foundation;
pub mod gpx;
pub mod model;
pub mod overlay;
pub mod screenshot;

pub use browser::{ChromeSession, PageSession, Viewport, login_rejected};
pub use collage::{CollageSummary, compose_collage, load_images, write_collage};
pub use config::{CollageSettings, Credentials, OverlaySettings};
pub use fetch::{ExportResponse, ExportSource, ReittiApiClient, fetch_year_paths};
pub use foundation::core::{Coordinate, MonthDay, YearRange};
pub use foundation::error::{ReittiError, ReittiResult};
pub use gpx::{parse_gpx_coordinates, try_parse_gpx_coordinates};
pub use model::{PathCollection, Screenshot, ScreenshotSet};
pub use overlay::{OverlaySummary, render_overlay_html, write_overlay};
pub use screenshot::{Readiness, capture_days};

/// Install the `tracing` fmt subscriber used by the binaries (`RUST_LOG`, default `info`).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
