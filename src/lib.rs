mod calendar;
mod config;
mod dates;
mod errors;
mod models;
mod store;
mod tracker;

pub use calendar::{activities_on, is_today, month_grid, Week};
pub use config::TrackerConfig;
pub use errors::{AppError, AppResult};
pub use models::{Activity, ActivityCollection, ActivityId, NewActivity, Status};
pub use store::Store;
pub use tracker::{MonthView, TrackerCore};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Daily-rolling JSON log under `app_data_dir/logs`, filter from the
/// environment with an `info` default. Call once at process startup.
pub fn init_logging(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "tracker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
