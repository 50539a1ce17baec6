//! Experiment report artifact

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{Recommendation, WinnerAnalysis};
use super::entity::{ExperimentId, ExperimentRecord};
use super::metrics::ExperimentMetrics;
use crate::domain::listing::Asin;
use crate::domain::quality::QualityGrade;
use crate::domain::storage::StorageEntity;

/// Denormalized summary of an experiment at report time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub experiment_id: ExperimentId,
    pub asin: Asin,
    pub created_at: DateTime<Utc>,
    pub quality_score: f64,
    pub quality_grade: QualityGrade,
    pub control_title: String,
    pub treatment_title: String,
    pub metrics: ExperimentMetrics,
    pub analysis: WinnerAnalysis,
    pub recommendation: Recommendation,
    pub generated_at: DateTime<Utc>,
}

impl ExperimentReport {
    /// Assemble a report from a record and a fresh metrics pull
    pub fn from_record(
        record: &ExperimentRecord,
        metrics: ExperimentMetrics,
        analysis: WinnerAnalysis,
    ) -> Self {
        let score = &record.verdict().score;

        Self {
            experiment_id: record.experiment_id().clone(),
            asin: record.asin().clone(),
            created_at: record.created_at(),
            quality_score: score.overall,
            quality_grade: score.grade,
            control_title: record.control_text().to_string(),
            treatment_title: record.treatment_text().to_string(),
            metrics,
            recommendation: analysis.recommendation,
            analysis,
            generated_at: Utc::now(),
        }
    }
}

impl StorageEntity for ExperimentReport {
    type Key = ExperimentId;

    fn key(&self) -> &Self::Key {
        &self.experiment_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::entity::fixtures::running_record;
    use crate::domain::experiment::{MetricsAnalyzer, VariantMetrics};

    #[test]
    fn test_report_from_record() {
        let record = running_record("EXP_1");
        let metrics = ExperimentMetrics::new(
            VariantMetrics::from_counts(10_000, 200, 20),
            VariantMetrics::from_counts(10_000, 250, 30),
        );
        let analysis = MetricsAnalyzer::default()
            .analyze(&metrics.control, &metrics.treatment)
            .unwrap();

        let report = ExperimentReport::from_record(&record, metrics, analysis);

        assert_eq!(report.experiment_id.as_str(), "EXP_1");
        assert_eq!(report.quality_score, 70.0);
        assert_eq!(report.quality_grade, QualityGrade::C);
        assert_eq!(report.control_title, "Wireless Headphones");
        assert_eq!(report.treatment_title, "Premium Wireless Headphones");
        assert_eq!(report.recommendation, Recommendation::Apply);
        assert!(report.generated_at >= report.created_at);
    }
}
