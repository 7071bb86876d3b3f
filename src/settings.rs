use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::DEFAULT_MAX_WIDGETS;
use crate::errors::{AppError, AppResult};
use crate::preview::DEFAULT_MAX_PREVIEW_BYTES;

pub const DATA_DIR_ENV: &str = "LOBSTERBOARD_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "LOBSTERBOARD_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub log_level: String,
    pub preview_cache_ttl_secs: u64,
    pub max_preview_bytes: usize,
    pub max_widgets_per_template: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            database_file: "templates.sqlite".to_string(),
            log_level: "info".to_string(),
            preview_cache_ttl_secs: 30,
            max_preview_bytes: DEFAULT_MAX_PREVIEW_BYTES,
            max_widgets_per_template: DEFAULT_MAX_WIDGETS,
        }
    }
}

impl EngineSettings {
    /// Reads YAML settings from `path` (defaults when the file is missing),
    /// then applies environment overrides.
    pub fn load(path: &Path) -> AppResult<Self> {
        let settings = if path.exists() {
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str::<Self>(&raw)?
            }
        } else {
            tracing::debug!(path = %path.display(), "settings file missing, using defaults");
            Self::default()
        };
        let settings = settings.with_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Applies `LOBSTERBOARD_*` overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(dir) = non_blank(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            self.log_level = level.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database_file.trim().is_empty() {
            return Err(AppError::Validation("databaseFile must not be empty".to_string()));
        }
        if self.max_widgets_per_template == 0 {
            return Err(AppError::Validation("maxWidgetsPerTemplate must be positive".to_string()));
        }
        if self.max_preview_bytes == 0 {
            return Err(AppError::Validation("maxPreviewBytes must be positive".to_string()));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn preview_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.preview_cache_ttl_secs)
    }
}
