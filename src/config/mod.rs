//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ContentBackend, ContentConfig, ExperimentConfig, LogFormat, LoggingConfig,
    PlatformConfig, StorageBackend, StorageConfig,
};
