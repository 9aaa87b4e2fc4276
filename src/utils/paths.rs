//! Path Utilities
//!
//! Resolves the application directory (~/.nexus/) and the files under it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Nexus directory (~/.nexus/)
pub fn nexus_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".nexus"))
}

/// Get the config file path (~/.nexus/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(nexus_dir()?.join("config.json"))
}

/// Get the database file path (~/.nexus/nexus.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(nexus_dir()?.join("nexus.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of a file exists
pub fn ensure_parent(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
