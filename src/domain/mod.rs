//! Domain layer - Core business logic and entities

pub mod error;
pub mod experiment;
pub mod listing;
pub mod platform;
pub mod quality;
pub mod storage;

pub use error::DomainError;
pub use experiment::{
    ExperimentAttribute, ExperimentId, ExperimentMetrics, ExperimentOutcome, ExperimentRecord,
    ExperimentRecordRepository, ExperimentReport, ExperimentReportRepository, ExperimentStatus,
    LifecyclePhase, MetricsAnalyzer, MetricsCollection, VariantMetrics, WinnerAnalysis,
};
pub use listing::{Asin, ContentStore, ListingContent};
pub use platform::{ExperimentPlatform, PlatformConnector};
pub use quality::{EligibilityGate, EligibilityVerdict, QualityScoreResult, ScoreEngine};
pub use storage::{Storage, StorageEntity, StorageKey};
