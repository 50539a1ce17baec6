//! MYE Runner
//!
//! Quality-gated listing experiments:
//! - Listing Quality Score (LQS) over six weighted dimensions
//! - Eligibility gate in front of experiment creation
//! - Experiment lifecycle against the seller platform (create, monitor, report)
//! - File or in-memory persistence of experiment records and reports

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ContentBackend, StorageBackend};
use domain::experiment::{ExperimentRecord, ExperimentReport};
use domain::listing::ContentStore;
use domain::DomainError;
use infrastructure::{
    content::{FileContentStore, S3ContentConfig, S3ContentStore},
    experiment::{StorageExperimentRecordRepository, StorageExperimentReportRepository},
    platform::{HttpClient, HttpPlatformConnector, PlatformCredentials},
    services::{ExperimentDefaults, ExperimentLifecycle, QualityService},
    storage::{StorageConfig, StorageFactory},
};

/// Storage collection holding experiment records
pub const RECORDS_COLLECTION: &str = "records";

/// Storage collection holding generated reports
pub const REPORTS_COLLECTION: &str = "reports";

/// Map the configured backend onto a storage configuration
pub fn storage_config(config: &AppConfig) -> StorageConfig {
    match config.storage.backend {
        StorageBackend::File => StorageConfig::file(&config.storage.directory),
        StorageBackend::Memory => StorageConfig::in_memory(),
    }
}

/// Build the experiment lifecycle with HTTP platform access and configured storage
pub fn create_lifecycle(config: &AppConfig) -> Result<ExperimentLifecycle, DomainError> {
    let client = HttpClient::with_timeout(Duration::from_secs(config.platform.timeout_secs))?;
    let connector = HttpPlatformConnector::new(
        Arc::new(client),
        config.platform.base_url.clone(),
        PlatformCredentials::new(&config.platform.email, &config.platform.password),
    );

    let storage = storage_config(config);
    let record_storage = StorageFactory::create::<ExperimentRecord>(&storage, RECORDS_COLLECTION);
    let report_storage = StorageFactory::create::<ExperimentReport>(&storage, REPORTS_COLLECTION);
    let records = StorageExperimentRecordRepository::new(record_storage);
    let reports = StorageExperimentReportRepository::new(report_storage);

    tracing::debug!(
        storage = ?storage.storage_type(),
        base_url = %config.platform.base_url,
        "Experiment lifecycle configured"
    );

    Ok(ExperimentLifecycle::new(Arc::new(connector), Arc::new(records), Arc::new(reports))
        .with_defaults(ExperimentDefaults {
            duration_days: config.experiment.default_duration_days,
            traffic_split: config.experiment.default_traffic_split,
        }))
}

/// Build the configured content store
pub async fn create_content_store(
    config: &AppConfig,
) -> Result<Arc<dyn ContentStore>, DomainError> {
    let content = &config.content;

    match content.backend {
        ContentBackend::File => Ok(Arc::new(
            FileContentStore::new(&content.directory).with_prefix(&content.prefix),
        )),
        ContentBackend::S3 => {
            let bucket = content
                .bucket
                .clone()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| {
                    DomainError::configuration("content.bucket is required for the s3 backend")
                })?;

            let mut s3 = S3ContentConfig::new(bucket).with_prefix(&content.prefix);
            if let Some(region) = &content.region {
                s3 = s3.with_region(region);
            }

            Ok(Arc::new(S3ContentStore::new(s3).await))
        }
    }
}

/// Build the quality service over the configured content store
pub async fn create_quality_service(config: &AppConfig) -> Result<QualityService, DomainError> {
    Ok(QualityService::new(create_content_store(config).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::Asin;
    use crate::infrastructure::storage::StorageType;
    use tempfile::tempdir;

    #[test]
    fn test_storage_config_follows_backend() {
        let mut config = AppConfig::default();
        assert_eq!(storage_config(&config).storage_type(), StorageType::File);

        config.storage.backend = StorageBackend::Memory;
        assert_eq!(storage_config(&config), StorageConfig::InMemory);
    }

    #[tokio::test]
    async fn test_lifecycle_uses_configured_defaults() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.experiment.default_duration_days = 14;

        let lifecycle = create_lifecycle(&config).unwrap();

        assert_eq!(lifecycle.defaults().duration_days, 14);
        assert!(lifecycle.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quality_service_reads_file_store() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("B01TEST.json"),
            r#"{"title": "Headphones", "bullets": ["Good sound"]}"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.content.directory = dir.path().to_path_buf();

        let service = create_quality_service(&config).await.unwrap();
        let result = service
            .score_asin(&Asin::new("B01TEST").unwrap())
            .await
            .unwrap();

        assert_eq!(result.overall, 45.0);
    }

    #[tokio::test]
    async fn test_s3_store_requires_bucket() {
        let mut config = AppConfig::default();
        config.content.backend = ContentBackend::S3;

        let err = create_content_store(&config).await.unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
