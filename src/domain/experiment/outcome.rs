//! Results returned by lifecycle operations

use serde::Serialize;

use super::analysis::WinnerAnalysis;
use super::entity::{ExperimentId, ExperimentRecord, ExperimentStatus};
use super::metrics::ExperimentMetrics;
use crate::domain::listing::Asin;
use crate::domain::quality::EligibilityVerdict;
use crate::domain::DomainError;

/// Result of a run request
///
/// Ineligibility is an outcome, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentOutcome {
    /// The gate rejected the listing; nothing was created or persisted
    Blocked { verdict: EligibilityVerdict },
    /// The experiment was created and recorded
    Running {
        verdict: EligibilityVerdict,
        record: Box<ExperimentRecord>,
    },
}

impl ExperimentOutcome {
    pub fn status(&self) -> ExperimentStatus {
        match self {
            Self::Blocked { .. } => ExperimentStatus::Blocked,
            Self::Running { .. } => ExperimentStatus::Running,
        }
    }

    pub fn verdict(&self) -> &EligibilityVerdict {
        match self {
            Self::Blocked { verdict } | Self::Running { verdict, .. } => verdict,
        }
    }

    pub fn record(&self) -> Option<&ExperimentRecord> {
        match self {
            Self::Blocked { .. } => None,
            Self::Running { record, .. } => Some(record.as_ref()),
        }
    }

    pub fn experiment_id(&self) -> Option<&ExperimentId> {
        self.record().map(ExperimentRecord::experiment_id)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// One metrics pull and its analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsCollection {
    pub experiment_id: ExperimentId,
    pub metrics: ExperimentMetrics,
    pub analysis: WinnerAnalysis,
}

// ============================================================================
// Batch runs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Running,
    Blocked,
    Failed,
}

/// Status line for one ASIN of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub asin: Asin,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<ExperimentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lqs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn from_result(asin: Asin, result: &Result<ExperimentOutcome, DomainError>) -> Self {
        match result {
            Ok(outcome) => Self {
                asin,
                status: match outcome.status() {
                    ExperimentStatus::Running => BatchStatus::Running,
                    ExperimentStatus::Blocked => BatchStatus::Blocked,
                },
                experiment_id: outcome.experiment_id().cloned(),
                lqs: Some(outcome.verdict().overall()),
                error: None,
            },
            Err(e) => Self {
                asin,
                status: BatchStatus::Failed,
                experiment_id: None,
                lqs: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Per-ASIN results of a batch with counts by status
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub running: usize,
    pub blocked: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        let count = |status: BatchStatus| entries.iter().filter(|e| e.status == status).count();

        Self {
            running: count(BatchStatus::Running),
            blocked: count(BatchStatus::Blocked),
            failed: count(BatchStatus::Failed),
            entries,
        }
    }
}
