//! TOML Configuration Management
//!
//! Handles reading and writing the responder configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::settings::{ResponderConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Configuration service for managing responder settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: ResponderConfig,
}

impl ConfigService {
    /// Default location: `<config_dir>/incident-responder/config.toml`
    pub fn default_path() -> AppResult<PathBuf> {
        config_path()
    }

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            debug!(path = %config_path.display(), "config file not found, using defaults");
            ResponderConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<ResponderConfig> {
        let content = fs::read_to_string(path)?;
        let config: ResponderConfig = toml::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file
    fn save_to_file(path: &Path, config: &ResponderConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| AppError::config(format!("Failed to encode config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Consume the service, returning the configuration
    pub fn into_config(self) -> ResponderConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply per-run overrides without persisting them
    pub fn apply_overrides(&mut self, update: SettingsUpdate) -> AppResult<&ResponderConfig> {
        self.config.apply_update(update);
        self.config.validate().map_err(AppError::validation)?;
        Ok(&self.config)
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }
}
