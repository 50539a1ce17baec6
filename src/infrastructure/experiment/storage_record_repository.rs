//! Storage-backed experiment record repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::experiment::{
    ExperimentId, ExperimentRecord, ExperimentRecordRepository, MetricsEntry,
};
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// Storage-backed implementation of ExperimentRecordRepository
#[derive(Debug)]
pub struct StorageExperimentRecordRepository {
    storage: Arc<dyn Storage<ExperimentRecord>>,
    append_lock: Mutex<()>,
}

impl StorageExperimentRecordRepository {
    /// Create a new storage-backed repository
    pub fn new(storage: Arc<dyn Storage<ExperimentRecord>>) -> Self {
        Self {
            storage,
            append_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ExperimentRecordRepository for StorageExperimentRecordRepository {
    async fn create(&self, record: ExperimentRecord) -> Result<ExperimentRecord, DomainError> {
        self.storage.create(record).await
    }

    async fn get(&self, id: &ExperimentId) -> Result<Option<ExperimentRecord>, DomainError> {
        self.storage.get(id).await
    }

    async fn update(&self, record: ExperimentRecord) -> Result<ExperimentRecord, DomainError> {
        self.storage.update(record).await
    }

    async fn append_metrics(
        &self,
        id: &ExperimentId,
        entry: MetricsEntry,
    ) -> Result<ExperimentRecord, DomainError> {
        let _guard = self.append_lock.lock().await;

        let mut record = self
            .storage
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Experiment '{}' not found", id)))?;

        record
            .record_metrics(entry)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        debug!(
            experiment_id = %id,
            entries = record.metrics_history().len(),
            "Appended metrics entry"
        );

        self.storage.update(record).await
    }

    async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        let mut records = self.storage.list().await?;
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records)
    }
}
