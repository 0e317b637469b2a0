use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use foodtracker_core::MealArchive;

/// Number of stars the rating control offers when nothing else is configured.
pub const DEFAULT_STAR_COUNT: u32 = 5;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the meal archive
    pub data_dir: ConfigValue<PathBuf>,
    /// Number of stars offered by `meal rate`
    pub star_count: ConfigValue<u32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    star_count: Option<u32>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut star_count = ConfigValue::new(DEFAULT_STAR_COUNT, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(count) = file_config.star_count {
                star_count = ConfigValue::new(count, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("FOODTRACKER_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(count) = std::env::var("FOODTRACKER_STAR_COUNT") {
            let parsed = count.parse().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "FOODTRACKER_STAR_COUNT must be a positive integer, got '{}'",
                    count
                ))
            })?;
            star_count = ConfigValue::new(parsed, ConfigSource::Environment);
        }

        if star_count.value == 0 {
            return Err(ConfigError::InvalidValue(
                "star_count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            data_dir,
            star_count,
            config_file,
        })
    }

    /// Returns the archive inside the configured data directory.
    pub fn archive(&self) -> MealArchive {
        MealArchive::in_dir(&self.data_dir.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/foodtracker/
    /// - macOS: ~/Library/Application Support/foodtracker/
    /// - Windows: %APPDATA%/foodtracker/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foodtracker")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/foodtracker/
    /// - macOS: ~/Library/Application Support/foodtracker/
    /// - Windows: %APPDATA%/foodtracker/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foodtracker")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
