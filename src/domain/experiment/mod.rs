//! Experiment domain module for listing A/B tests
//!
//! Types for experiments created on the seller platform, the metrics they
//! collect and the analysis that picks a winning variant.

mod analysis;
mod entity;
mod metrics;
mod outcome;
mod report;
mod repository;
mod validation;

pub use analysis::{
    ClickThroughFirstPolicy, Confidence, Lifts, MetricsAnalyzer, Recommendation, Winner,
    WinnerAnalysis, WinnerPolicy,
};
pub use entity::{
    ExperimentAttribute, ExperimentId, ExperimentRecord, ExperimentStatus, LifecyclePhase,
    MetricsEntry,
};
pub use metrics::{ExperimentMetrics, VariantMetrics};
pub use outcome::{BatchEntry, BatchStatus, BatchSummary, ExperimentOutcome, MetricsCollection};
pub use report::ExperimentReport;
pub use repository::{ExperimentRecordRepository, ExperimentReportRepository};
pub use validation::{
    validate_duration, validate_traffic_split, validate_variant_text, ExperimentValidationError,
};

#[cfg(test)]
pub(crate) use entity::fixtures;
#[cfg(test)]
pub use repository::mock::{MockExperimentRecordRepository, MockExperimentReportRepository};
