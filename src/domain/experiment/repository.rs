//! Experiment repository traits

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ExperimentId, ExperimentRecord, MetricsEntry};
use super::report::ExperimentReport;
use crate::domain::DomainError;

// ============================================================================
// ExperimentRecordRepository
// ============================================================================

/// Repository trait for local experiment records
#[async_trait]
pub trait ExperimentRecordRepository: Send + Sync + Debug {
    /// Persist a new record, fails with `Conflict` if the id is taken
    async fn create(&self, record: ExperimentRecord) -> Result<ExperimentRecord, DomainError>;

    /// Get a record by ID
    async fn get(&self, id: &ExperimentId) -> Result<Option<ExperimentRecord>, DomainError>;

    /// Replace an existing record
    async fn update(&self, record: ExperimentRecord) -> Result<ExperimentRecord, DomainError>;

    /// Append one metrics entry to the record's history
    async fn append_metrics(
        &self,
        id: &ExperimentId,
        entry: MetricsEntry,
    ) -> Result<ExperimentRecord, DomainError>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError>;
}

// ============================================================================
// ExperimentReportRepository
// ============================================================================

/// Repository trait for generated reports
#[async_trait]
pub trait ExperimentReportRepository: Send + Sync + Debug {
    /// Store a report, replacing any earlier one for the same experiment
    async fn save(&self, report: ExperimentReport) -> Result<ExperimentReport, DomainError>;

    async fn get(&self, id: &ExperimentId) -> Result<Option<ExperimentReport>, DomainError>;
}
