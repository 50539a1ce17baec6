use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::experiment::{validate_duration, validate_traffic_split};
use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub storage: StorageConfig,
    pub content: ContentConfig,
    pub experiment: ExperimentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    #[default]
    File,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub backend: ContentBackend,
    pub directory: PathBuf,
    pub bucket: Option<String>,
    pub prefix: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub default_duration_days: u32,
    pub default_traffic_split: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            email: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            directory: PathBuf::from("data"),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::default(),
            directory: PathBuf::from("listings"),
            bucket: None,
            prefix: String::new(),
            region: None,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 28,
            default_traffic_split: 50,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("MYE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject values that would only fail later, mid-operation
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_duration(self.experiment.default_duration_days).map_err(|e| {
            DomainError::configuration(format!("experiment.default_duration_days: {}", e))
        })?;
        validate_traffic_split(self.experiment.default_traffic_split).map_err(|e| {
            DomainError::configuration(format!("experiment.default_traffic_split: {}", e))
        })?;

        if self.platform.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "platform.timeout_secs must be greater than zero",
            ));
        }

        if self.content.backend == ContentBackend::S3
            && self.content.bucket.as_deref().is_none_or(str::is_empty)
        {
            return Err(DomainError::configuration(
                "content.bucket is required for the s3 backend",
            ));
        }

        Ok(())
    }
}
