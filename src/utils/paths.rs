//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "incident-responder";

/// Get the platform configuration directory (e.g. ~/.config on Linux)
pub fn config_dir() -> AppResult<PathBuf> {
    dirs::config_dir().ok_or_else(|| AppError::config("Could not determine config directory"))
}

/// Get the application directory (<config_dir>/incident-responder/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(config_dir()?.join(APP_DIR_NAME))
}

/// Get the config file path (<config_dir>/incident-responder/config.toml)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("config.toml"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
