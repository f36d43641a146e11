//! Configuration manager for loading, saving, and managing app configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::AppConfig;

/// Shared configuration manager type
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Configuration error types
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Loads, tracks and saves the [`AppConfig`]
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Create a new configuration manager, loading from the OS config dir
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Create a manager backed by a specific file
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = match Self::load_from_path(&config_path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::info!("No config file found, using defaults");
                AppConfig::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                AppConfig::new()
            }
        };

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dd-demo")
            .join("config.ron")
    }

    /// Returns `Ok(None)` when the file does not exist.
    fn load_from_path(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };

        let mut config: AppConfig =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;

        if let Err(e) = config.debug_draw.validate() {
            tracing::warn!("Invalid debug-draw settings, using defaults: {}", e);
            config.debug_draw = Default::default();
        }

        tracing::info!("Loaded config from {:?}", path);
        Ok(Some(config))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration (marks as dirty)
    pub fn config_mut(&mut self) -> &mut AppConfig {
        self.dirty = true;
        &mut self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save the configuration to disk if it changed
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::new();
        self.dirty = true;
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new shared configuration manager
pub fn create_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::new()))
}
