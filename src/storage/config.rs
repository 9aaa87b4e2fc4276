//! JSON Configuration Loading
//!
//! Reads the optional settings file, layers environment overrides on top and
//! validates the result. Settings are read once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::settings::AppSettings;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths;

/// Configuration service for loading app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: Option<PathBuf>,
    settings: AppSettings,
}

impl ConfigService {
    /// Load settings from `path` or `~/.nexus/config.json` (if present),
    /// then apply process environment overrides.
    pub fn load(path: Option<PathBuf>) -> AppResult<Self> {
        let path = path.or_else(|| paths::config_path().ok());
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load from an explicit file and variable lookup.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load_with<F>(path: Option<PathBuf>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match &path {
            Some(p) if p.exists() => Self::load_from_file(p)?,
            _ => AppSettings::default(),
        };
        settings.apply_env_from(lookup);
        settings.validate().map_err(AppError::config)?;

        debug!(
            config_file = ?path,
            remote_ai = settings.analysis.has_api_key(),
            models = ?settings.analysis.model_preferences(),
            "configuration loaded"
        );

        Ok(Self {
            config_path: path,
            settings,
        })
    }

    /// Load settings from a file
    fn load_from_file(path: &Path) -> AppResult<AppSettings> {
        let content = fs::read_to_string(path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Get the current settings
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn into_settings(self) -> AppSettings {
        self.settings
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Resolved database file
    pub fn database_path(&self) -> AppResult<PathBuf> {
        match &self.settings.database_path {
            Some(path) => Ok(path.clone()),
            None => paths::database_path(),
        }
    }
}
