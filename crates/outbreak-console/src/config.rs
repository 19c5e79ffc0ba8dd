use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SAVE_DIR: &str = "saves";
const DEFAULT_LOG_FILE: &str = "log.txt";
const DEFAULT_URGENT_LIMIT: usize = 10;

/// Console configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    #[serde(default = "default_save_dir")]
    pub save_dir: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            logging: LoggingConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ConsoleConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.save_dir.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "save_dir".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        self.logging.validate()?;
        self.forecast.validate()?;
        Ok(())
    }

    pub fn save_dir(&self) -> PathBuf {
        PathBuf::from(self.save_dir.trim())
    }
}

fn default_save_dir() -> String {
    DEFAULT_SAVE_DIR.to_string()
}

/// Log file settings. Logging is on by default and writes plain text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tracing_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_tracing_level(),
            file: default_log_file(),
            json: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            self.level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.level".to_string(),
                message: format!("unknown tracing level '{}'", self.level),
            });
        }
        if self.enabled && self.file.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "logging.file".to_string(),
                message: "log file must not be empty when logging is enabled".to_string(),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastConfig {
    #[serde(default = "default_urgent_limit")]
    pub urgent_limit: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            urgent_limit: DEFAULT_URGENT_LIMIT,
        }
    }
}

impl ForecastConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.urgent_limit == 0 {
            return Err(ValidationError::InvalidField {
                field: "forecast.urgent_limit".to_string(),
                message: "urgent limit must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_urgent_limit() -> usize {
    DEFAULT_URGENT_LIMIT
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
