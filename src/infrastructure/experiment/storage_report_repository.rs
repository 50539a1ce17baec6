//! Storage-backed experiment report repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::experiment::{ExperimentId, ExperimentReport, ExperimentReportRepository};
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// Keeps the latest report per experiment
#[derive(Debug)]
pub struct StorageExperimentReportRepository {
    storage: Arc<dyn Storage<ExperimentReport>>,
}

impl StorageExperimentReportRepository {
    pub fn new(storage: Arc<dyn Storage<ExperimentReport>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ExperimentReportRepository for StorageExperimentReportRepository {
    async fn save(&self, report: ExperimentReport) -> Result<ExperimentReport, DomainError> {
        self.storage.save(report).await
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<ExperimentReport>, DomainError> {
        self.storage.get(id).await
    }
}
