pub mod cache;
pub mod codec;
pub mod dashboard;
pub mod db;
pub mod engine;
pub mod errors;
pub mod gallery;
pub mod ids;
pub mod materializer;
pub mod models;
pub mod preview;
pub mod schema;
pub mod settings;
pub mod store;
pub mod widgets;

pub use crate::dashboard::Dashboard;
pub use crate::engine::TemplateEngine;
pub use crate::errors::{AppError, AppResult};
pub use crate::settings::EngineSettings;
pub use crate::widgets::{builtin_catalog, WidgetCatalog, WidgetDescriptor, WidgetRenderer};

use crate::db::Database;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Installs a JSON subscriber writing to a daily rolling `engine.log`
/// under `log_dir`. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(log_dir: &Path, level: &str) -> AppResult<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "engine.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}

/// Creates the data directory, opens the SQLite store and returns an
/// engine over the built-in widget catalog.
pub fn open_engine(settings: &EngineSettings) -> AppResult<TemplateEngine> {
    settings.validate()?;
    std::fs::create_dir_all(&settings.data_dir)?;
    let database = Database::new(&settings.database_path())?;
    tracing::info!(
        data_dir = %settings.data_dir.display(),
        database = %database.path().display(),
        "opened template store"
    );
    Ok(TemplateEngine::new(
        Arc::new(WidgetCatalog::with_builtins()),
        Arc::new(database),
        settings,
    ))
}
