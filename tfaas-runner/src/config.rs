//! Configuration for the runner.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the runner.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Model area configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding one subdirectory per model.
    pub dir: PathBuf,
    /// Model used when a request does not name one.
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Deadline for a single inference request (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Load every model in the model area at startup.
    #[serde(default = "default_true")]
    pub eager_load: bool,
}

impl RunnerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            eager_load: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8083
}
fn default_request_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (TFAAS__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder(File::with_name("config").required(false))?
            .build()?
            .try_deserialize()
    }

    /// Config with defaults for everything but the model directory.
    pub fn with_model_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            api: ApiConfig::default(),
            models: ModelsConfig {
                dir: dir.into(),
                default_model: None,
            },
            runner: RunnerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn builder(
        file: File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(ConfigLoader::builder()
            // Set defaults
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            .set_default("runner.request_timeout_secs", default_request_timeout() as i64)?
            .set_default("runner.eager_load", default_true())?
            .set_default("logging.level", default_log_level())?
            // Load from config.toml if exists
            .add_source(file)
            // Override with environment variables (TFAAS__SECTION__KEY format)
            .add_source(
                Environment::with_prefix("TFAAS")
                    .separator("__")
                    .try_parsing(true),
            ))
    }
}
