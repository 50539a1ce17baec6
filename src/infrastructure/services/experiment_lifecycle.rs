//! Experiment lifecycle service
//!
//! Validates a listing against the quality gate, creates the experiment on
//! the platform, then monitors and reports on it. Every platform call runs in
//! a scoped session that is closed on both success and failure.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::experiment::{
    validate_duration, validate_traffic_split, validate_variant_text, BatchEntry, BatchSummary,
    ExperimentAttribute, ExperimentId, ExperimentOutcome, ExperimentRecord,
    ExperimentRecordRepository, ExperimentReport, ExperimentReportRepository,
    ExperimentValidationError, MetricsAnalyzer, MetricsCollection, MetricsEntry,
};
use crate::domain::listing::{Asin, ListingContent};
use crate::domain::platform::{
    with_session, CreateExperimentParams, ExperimentSummary, PlatformConnector,
};
use crate::domain::quality::EligibilityGate;
use crate::domain::DomainError;

/// Default experiment length in days
pub const DEFAULT_DURATION_DAYS: u32 = 28;

/// Default control share of traffic in percent
pub const DEFAULT_TRAFFIC_SPLIT: u8 = 50;

// ============================================================================
// Request Types
// ============================================================================

/// Values applied when a run request leaves them unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentDefaults {
    pub duration_days: u32,
    pub traffic_split: u8,
}

impl Default for ExperimentDefaults {
    fn default() -> Self {
        Self {
            duration_days: DEFAULT_DURATION_DAYS,
            traffic_split: DEFAULT_TRAFFIC_SPLIT,
        }
    }
}

/// Request to start an experiment on one listing attribute
#[derive(Debug, Clone)]
pub struct RunExperimentRequest {
    pub asin: Asin,
    pub control_text: String,
    pub treatment_text: String,
    pub attribute: ExperimentAttribute,
    pub duration_days: Option<u32>,
    pub traffic_split: Option<u8>,
    /// Rest of the treatment listing, used only for scoring
    pub listing: Option<ListingContent>,
}

impl RunExperimentRequest {
    pub fn new(
        asin: Asin,
        control_text: impl Into<String>,
        treatment_text: impl Into<String>,
    ) -> Self {
        Self {
            asin,
            control_text: control_text.into(),
            treatment_text: treatment_text.into(),
            attribute: ExperimentAttribute::Title,
            duration_days: None,
            traffic_split: None,
            listing: None,
        }
    }

    pub fn with_attribute(mut self, attribute: ExperimentAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration_days = Some(days);
        self
    }

    pub fn with_traffic_split(mut self, split: u8) -> Self {
        self.traffic_split = Some(split);
        self
    }

    pub fn with_listing(mut self, listing: ListingContent) -> Self {
        self.listing = Some(listing);
        self
    }

    /// Treatment text placed into the listing context
    ///
    /// A title test replaces the title; a bullet test replaces that bullet
    /// slot, appending when the context has fewer bullets.
    pub fn treatment_listing(&self) -> ListingContent {
        let base = self.listing.clone().unwrap_or_default();

        match self.attribute.bullet_index() {
            None => ListingContent::new(&self.treatment_text)
                .with_bullets(base.bullets().to_vec())
                .with_description(base.description()),
            Some(index) => {
                let mut bullets = base.bullets().to_vec();
                if index < bullets.len() {
                    bullets[index] = self.treatment_text.clone();
                } else {
                    bullets.push(self.treatment_text.clone());
                }
                ListingContent::new(base.title())
                    .with_bullets(bullets)
                    .with_description(base.description())
            }
        }
    }

    fn validate(&self, duration_days: u32, traffic_split: u8) -> Result<(), ExperimentValidationError> {
        validate_variant_text("Control", &self.control_text)?;
        validate_variant_text("Treatment", &self.treatment_text)?;
        validate_duration(duration_days)?;
        validate_traffic_split(traffic_split)
    }
}

// ============================================================================
// Experiment Lifecycle
// ============================================================================

/// Runs quality-gated experiments from creation to report
#[derive(Debug)]
pub struct ExperimentLifecycle {
    gate: EligibilityGate,
    analyzer: MetricsAnalyzer,
    connector: Arc<dyn PlatformConnector>,
    records: Arc<dyn ExperimentRecordRepository>,
    reports: Arc<dyn ExperimentReportRepository>,
    defaults: ExperimentDefaults,
}

impl ExperimentLifecycle {
    pub fn new(
        connector: Arc<dyn PlatformConnector>,
        records: Arc<dyn ExperimentRecordRepository>,
        reports: Arc<dyn ExperimentReportRepository>,
    ) -> Self {
        Self {
            gate: EligibilityGate::default(),
            analyzer: MetricsAnalyzer::default(),
            connector,
            records,
            reports,
            defaults: ExperimentDefaults::default(),
        }
    }

    pub fn with_gate(mut self, gate: EligibilityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_analyzer(mut self, analyzer: MetricsAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_defaults(mut self, defaults: ExperimentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> ExperimentDefaults {
        self.defaults
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Title experiment scored on the treatment title alone
    pub async fn run_experiment(
        &self,
        asin: &Asin,
        control_text: &str,
        treatment_text: &str,
        duration_days: u32,
    ) -> Result<ExperimentOutcome, DomainError> {
        let request = RunExperimentRequest::new(asin.clone(), control_text, treatment_text)
            .with_listing(ListingContent::title_only(treatment_text))
            .with_duration(duration_days);

        self.run(request).await
    }

    /// Gate the treatment listing and, when eligible, create the experiment
    pub async fn run(&self, request: RunExperimentRequest) -> Result<ExperimentOutcome, DomainError> {
        let duration_days = request.duration_days.unwrap_or(self.defaults.duration_days);
        let traffic_split = request.traffic_split.unwrap_or(self.defaults.traffic_split);

        let verdict = self.gate.validate(&request.asin, &request.treatment_listing());

        if !verdict.eligible {
            info!(
                asin = %request.asin,
                score = verdict.overall(),
                "Listing below quality threshold, experiment blocked"
            );
            return Ok(ExperimentOutcome::Blocked { verdict });
        }

        request
            .validate(duration_days, traffic_split)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        debug!(
            asin = %request.asin,
            attribute = %request.attribute,
            score = verdict.overall(),
            "Listing eligible, creating experiment"
        );

        let params = CreateExperimentParams {
            asin: request.asin.clone(),
            attribute: request.attribute,
            control_text: request.control_text.clone(),
            treatment_text: request.treatment_text.clone(),
            duration_days,
            traffic_split,
        };

        let metadata = with_session(self.connector.as_ref(), |session| async move {
            session.login().await?;
            session.create_experiment(&params).await
        })
        .await?;

        let created_at = metadata.created_at.unwrap_or_else(Utc::now);
        let experiment_id = match metadata.experiment_id.as_deref().map(ExperimentId::new) {
            Some(Ok(id)) => id,
            Some(Err(e)) => {
                warn!(
                    platform_id = metadata.experiment_id.as_deref().unwrap_or_default(),
                    error = %e,
                    "Platform returned an unusable experiment id, generating one"
                );
                ExperimentId::fallback(created_at)
            }
            None => ExperimentId::fallback(created_at),
        };

        let record = ExperimentRecord::new(
            experiment_id,
            request.asin.clone(),
            verdict.clone(),
            created_at,
        )
        .with_attribute(request.attribute)
        .with_variants(request.control_text, request.treatment_text)
        .with_schedule(duration_days, traffic_split);

        let record = self.records.create(record).await?;

        info!(
            experiment_id = %record.experiment_id(),
            asin = %record.asin(),
            "Experiment created"
        );

        Ok(ExperimentOutcome::Running {
            verdict,
            record: Box::new(record),
        })
    }

    /// Run requests one after another; a failed entry does not stop the rest
    pub async fn run_batch(&self, requests: Vec<RunExperimentRequest>) -> BatchSummary {
        let mut entries = Vec::with_capacity(requests.len());

        for request in requests {
            let asin = request.asin.clone();
            let result = self.run(request).await;

            if let Err(e) = &result {
                warn!(asin = %asin, error = %e, "Batch entry failed");
            }
            entries.push(BatchEntry::from_result(asin, &result));
        }

        let summary = BatchSummary::new(entries);
        info!(
            running = summary.running,
            blocked = summary.blocked,
            failed = summary.failed,
            "Batch finished"
        );
        summary
    }

    // ========================================================================
    // Monitoring
    // ========================================================================

    /// Pull metrics for a known experiment and append them to its history
    pub async fn collect_metrics(&self, experiment_id: &str) -> Result<MetricsCollection, DomainError> {
        let id = parse_id(experiment_id)?;
        self.require_record(&id).await?;

        let platform_id = id.as_str().to_string();
        let metrics = with_session(self.connector.as_ref(), |session| async move {
            session.login().await?;
            session.fetch_metrics(&platform_id).await
        })
        .await?;

        let analysis = self.analyzer.analyze(&metrics.control, &metrics.treatment)?;

        self.records
            .append_metrics(&id, MetricsEntry::new(metrics, analysis))
            .await?;

        info!(
            experiment_id = %id,
            winner = %analysis.winner,
            ctr_lift = analysis.ctr_lift_percent,
            "Collected experiment metrics"
        );

        Ok(MetricsCollection {
            experiment_id: id,
            metrics,
            analysis,
        })
    }

    /// Collect fresh metrics and store a report built from them
    pub async fn generate_report(&self, experiment_id: &str) -> Result<ExperimentReport, DomainError> {
        let collection = self.collect_metrics(experiment_id).await?;
        let id = collection.experiment_id;
        let mut record = self.require_record(&id).await?;

        let report = ExperimentReport::from_record(&record, collection.metrics, collection.analysis);
        let report = self.reports.save(report).await?;

        record
            .mark_reported()
            .map_err(|e| DomainError::validation(e.to_string()))?;
        self.records.update(record).await?;

        info!(
            experiment_id = %id,
            recommendation = %report.recommendation,
            "Experiment report generated"
        );

        Ok(report)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Experiments as the platform lists them
    pub async fn list_experiments(&self) -> Result<Vec<ExperimentSummary>, DomainError> {
        with_session(self.connector.as_ref(), |session| async move {
            session.login().await?;
            session.list_experiments().await
        })
        .await
    }

    /// Locally recorded experiments, newest first
    pub async fn list_records(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        self.records.list().await
    }

    pub async fn get_record(&self, experiment_id: &str) -> Result<ExperimentRecord, DomainError> {
        let id = parse_id(experiment_id)?;
        self.require_record(&id).await
    }

    async fn require_record(&self, id: &ExperimentId) -> Result<ExperimentRecord, DomainError> {
        self.records
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Experiment '{}' not found", id)))
    }
}

fn parse_id(id: &str) -> Result<ExperimentId, DomainError> {
    ExperimentId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::fixtures::running_record;
    use crate::domain::experiment::{
        ExperimentMetrics, ExperimentStatus, LifecyclePhase, MockExperimentRecordRepository,
        MockExperimentReportRepository, Recommendation, VariantMetrics, Winner,
    };
    use crate::domain::platform::mock::MockPlatformConnector;
    use crate::domain::quality::fixtures::{threshold_listing, STRONG_TITLE};

    struct Harness {
        connector: Arc<MockPlatformConnector>,
        records: Arc<MockExperimentRecordRepository>,
        reports: Arc<MockExperimentReportRepository>,
        lifecycle: ExperimentLifecycle,
    }

    fn harness(connector: MockPlatformConnector, records: MockExperimentRecordRepository) -> Harness {
        let connector = Arc::new(connector);
        let records = Arc::new(records);
        let reports = Arc::new(MockExperimentReportRepository::new());
        let lifecycle = ExperimentLifecycle::new(connector.clone(), records.clone(), reports.clone());

        Harness {
            connector,
            records,
            reports,
            lifecycle,
        }
    }

    fn asin() -> Asin {
        Asin::new("B01TEST").unwrap()
    }

    fn eligible_request() -> RunExperimentRequest {
        RunExperimentRequest::new(asin(), "Wireless Headphones", STRONG_TITLE)
            .with_listing(threshold_listing())
    }

    fn winning_metrics() -> ExperimentMetrics {
        ExperimentMetrics::new(
            VariantMetrics::from_counts(10_000, 200, 20),
            VariantMetrics::from_counts(10_000, 250, 30),
        )
    }

    mod run {
        use super::*;

        #[tokio::test]
        async fn test_blocked_listing_never_contacts_platform() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let outcome = h
                .lifecycle
                .run_experiment(&asin(), "Headphones", "Wireless Headphones", 14)
                .await
                .unwrap();

            assert!(outcome.is_blocked());
            assert_eq!(outcome.status(), ExperimentStatus::Blocked);
            assert!(!outcome.verdict().blockers.is_empty());
            assert_eq!(h.connector.connects(), 0);
            assert_eq!(h.records.len(), 0);
        }

        #[tokio::test]
        async fn test_title_only_run_uses_title_score() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let outcome = h
                .lifecycle
                .run_experiment(&asin(), "Wireless Headphones", STRONG_TITLE, 28)
                .await
                .unwrap();

            assert!(outcome.is_blocked());
            assert_eq!(outcome.verdict().overall(), 62.0);
        }

        #[tokio::test]
        async fn test_eligible_listing_creates_running_record() {
            let h = harness(
                MockPlatformConnector::new().with_experiment_id("EXP_42"),
                MockExperimentRecordRepository::new(),
            );

            let outcome = h.lifecycle.run(eligible_request()).await.unwrap();

            assert_eq!(outcome.status(), ExperimentStatus::Running);
            assert_eq!(outcome.experiment_id().unwrap().as_str(), "EXP_42");
            assert_eq!(outcome.verdict().overall(), 70.0);

            let record = outcome.record().unwrap();
            assert_eq!(record.phase(), LifecyclePhase::Running);
            assert_eq!(record.duration_days(), DEFAULT_DURATION_DAYS);
            assert_eq!(record.traffic_split(), DEFAULT_TRAFFIC_SPLIT);
            assert!(record.metrics_history().is_empty());

            assert_eq!(h.records.len(), 1);
            assert_eq!(h.connector.logins(), 1);
            assert_eq!(h.connector.closes(), 1);

            let params = h.connector.created_params();
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].control_text, "Wireless Headphones");
            assert_eq!(params[0].treatment_text, STRONG_TITLE);
        }

        #[tokio::test]
        async fn test_missing_platform_id_uses_fallback() {
            let h = harness(
                MockPlatformConnector::new().without_experiment_id(),
                MockExperimentRecordRepository::new(),
            );

            let outcome = h.lifecycle.run(eligible_request()).await.unwrap();

            let id = outcome.experiment_id().unwrap().as_str();
            let (seconds, suffix) = id["EXP_".len()..].split_once('_').unwrap();
            assert!(id.starts_with("EXP_"));
            assert!(seconds.parse::<i64>().is_ok());
            assert_eq!(suffix.len(), 8);
        }

        #[tokio::test]
        async fn test_fallback_ids_do_not_collide() {
            let h = harness(
                MockPlatformConnector::new().without_experiment_id(),
                MockExperimentRecordRepository::new(),
            );

            let first = h.lifecycle.run(eligible_request()).await.unwrap();
            let second = h.lifecycle.run(eligible_request()).await.unwrap();

            assert_ne!(first.experiment_id(), second.experiment_id());
            assert_eq!(h.connector.creates(), 2);
            assert_eq!(h.records.len(), 2);
        }

        #[tokio::test]
        async fn test_platform_id_with_dots_is_kept() {
            let metrics = winning_metrics();
            let h = harness(
                MockPlatformConnector::new()
                    .with_experiment_id("exp.2024.001")
                    .with_metrics(metrics),
                MockExperimentRecordRepository::new(),
            );

            let outcome = h.lifecycle.run(eligible_request()).await.unwrap();
            assert_eq!(outcome.experiment_id().unwrap().as_str(), "exp.2024.001");

            let collection = h.lifecycle.collect_metrics("exp.2024.001").await.unwrap();
            assert_eq!(collection.metrics, metrics);
            assert_eq!(h.connector.fetched_ids(), vec!["exp.2024.001".to_string()]);
        }

        #[tokio::test]
        async fn test_platform_id_with_separator_replaced() {
            let h = harness(
                MockPlatformConnector::new().with_experiment_id("exp/1"),
                MockExperimentRecordRepository::new(),
            );

            let outcome = h.lifecycle.run(eligible_request()).await.unwrap();

            assert!(outcome.experiment_id().unwrap().as_str().starts_with("EXP_"));
        }

        #[tokio::test]
        async fn test_failed_creation_persists_nothing() {
            let h = harness(
                MockPlatformConnector::new().failing_on("create_experiment"),
                MockExperimentRecordRepository::new(),
            );

            let err = h.lifecycle.run(eligible_request()).await.unwrap_err();

            assert!(err.is_collaborator_failure());
            assert_eq!(h.records.len(), 0);
            assert_eq!(h.connector.closes(), 1);
        }

        #[tokio::test]
        async fn test_failed_login_closes_session() {
            let h = harness(
                MockPlatformConnector::new().failing_on("login"),
                MockExperimentRecordRepository::new(),
            );

            assert!(h.lifecycle.run(eligible_request()).await.is_err());
            assert_eq!(h.connector.creates(), 0);
            assert_eq!(h.connector.closes(), 1);
        }

        #[tokio::test]
        async fn test_request_schedule_is_forwarded() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let request = eligible_request().with_duration(14).with_traffic_split(70);
            let outcome = h.lifecycle.run(request).await.unwrap();

            let record = outcome.record().unwrap();
            assert_eq!(record.duration_days(), 14);
            assert_eq!(record.traffic_split(), 70);
            assert_eq!(h.connector.created_params()[0].traffic_split, 70);
        }

        #[tokio::test]
        async fn test_configured_defaults_apply() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());
            let lifecycle = h.lifecycle.with_defaults(ExperimentDefaults {
                duration_days: 21,
                traffic_split: 60,
            });

            let outcome = lifecycle.run(eligible_request()).await.unwrap();

            assert_eq!(outcome.record().unwrap().duration_days(), 21);
            assert_eq!(outcome.record().unwrap().traffic_split(), 60);
        }

        #[tokio::test]
        async fn test_blocked_even_with_invalid_schedule() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let outcome = h
                .lifecycle
                .run_experiment(&asin(), "Headphones", "Wireless Headphones", 0)
                .await
                .unwrap();

            assert!(outcome.is_blocked());
            assert_eq!(h.connector.connects(), 0);
        }

        #[tokio::test]
        async fn test_long_durations_accepted() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let outcome = h
                .lifecycle
                .run(eligible_request().with_duration(120))
                .await
                .unwrap();

            assert_eq!(outcome.record().unwrap().duration_days(), 120);
        }

        #[tokio::test]
        async fn test_invalid_eligible_requests_rejected() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let cases = [
                RunExperimentRequest::new(asin(), "", STRONG_TITLE).with_listing(threshold_listing()),
                eligible_request().with_duration(0),
                eligible_request().with_traffic_split(0),
                eligible_request().with_traffic_split(100),
            ];

            for request in cases {
                let err = h.lifecycle.run(request).await.unwrap_err();
                assert!(matches!(err, DomainError::Validation { .. }), "{:?}", err);
            }

            assert_eq!(h.connector.connects(), 0);
        }

        #[tokio::test]
        async fn test_bullet_experiment_scores_replaced_bullet() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let request = RunExperimentRequest::new(asin(), "Unique design", "Proven results")
                .with_attribute(ExperimentAttribute::Bullet2)
                .with_listing(ListingContent::new(STRONG_TITLE).with_bullets(["Unique design"]));

            let listing = request.treatment_listing();
            assert_eq!(listing.title(), STRONG_TITLE);
            assert_eq!(listing.bullets().len(), 2);

            let outcome = h.lifecycle.run(request).await.unwrap();
            assert!(!outcome.is_blocked());
            assert_eq!(
                outcome.record().unwrap().attribute(),
                ExperimentAttribute::Bullet2
            );
        }
    }

    mod batch {
        use super::*;
        use crate::domain::experiment::BatchStatus;

        #[tokio::test]
        async fn test_batch_reports_each_asin() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let requests = vec![
                eligible_request(),
                RunExperimentRequest::new(Asin::new("B02WEAK").unwrap(), "Old", "Headphones"),
            ];
            let summary = h.lifecycle.run_batch(requests).await;

            assert_eq!((summary.running, summary.blocked, summary.failed), (1, 1, 0));
            assert_eq!(summary.entries[0].status, BatchStatus::Running);
            assert_eq!(summary.entries[0].lqs, Some(70.0));
            assert_eq!(summary.entries[1].asin.as_str(), "B02WEAK");
            assert_eq!(summary.entries[1].status, BatchStatus::Blocked);
            assert_eq!(h.connector.creates(), 1);
        }

        #[tokio::test]
        async fn test_batch_continues_after_failure() {
            let h = harness(
                MockPlatformConnector::new().with_experiment_id("EXP_DUP"),
                MockExperimentRecordRepository::new(),
            );

            let summary = h
                .lifecycle
                .run_batch(vec![eligible_request(), eligible_request(), eligible_request()])
                .await;

            assert_eq!((summary.running, summary.failed), (1, 2));
            assert!(summary.entries[1].error.as_deref().unwrap().contains("EXP_DUP"));
            assert_eq!(h.connector.creates(), 3);
        }
    }

    mod collect {
        use super::*;

        #[tokio::test]
        async fn test_unknown_experiment_is_not_found() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let err = h.lifecycle.collect_metrics("EXP_404").await.unwrap_err();

            assert!(err.is_not_found());
            assert_eq!(h.connector.connects(), 0);
        }

        #[tokio::test]
        async fn test_invalid_id_rejected() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let err = h.lifecycle.collect_metrics("../etc").await.unwrap_err();

            assert!(matches!(err, DomainError::InvalidId { .. }));
        }

        #[tokio::test]
        async fn test_each_collection_appends_one_entry() {
            let h = harness(
                MockPlatformConnector::new().with_metrics(winning_metrics()),
                MockExperimentRecordRepository::new().with_record(running_record("EXP_1")),
            );

            let first = h.lifecycle.collect_metrics("EXP_1").await.unwrap();
            assert_eq!(first.analysis.winner, Winner::Treatment);
            assert_eq!(first.analysis.ctr_lift_percent, 25.0);
            assert_eq!(first.analysis.recommendation, Recommendation::Apply);

            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert_eq!(record.metrics_history().len(), 1);
            assert_eq!(record.phase(), LifecyclePhase::MetricsCollected);

            h.lifecycle.collect_metrics("EXP_1").await.unwrap();
            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert_eq!(record.metrics_history().len(), 2);
            assert_eq!(h.connector.closes(), 2);
        }

        #[tokio::test]
        async fn test_fetch_failure_leaves_history_untouched() {
            let h = harness(
                MockPlatformConnector::new().failing_on("fetch_metrics"),
                MockExperimentRecordRepository::new().with_record(running_record("EXP_1")),
            );

            let err = h.lifecycle.collect_metrics("EXP_1").await.unwrap_err();

            assert!(err.is_collaborator_failure());
            assert_eq!(h.connector.closes(), 1);
            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert!(record.metrics_history().is_empty());
            assert_eq!(record.phase(), LifecyclePhase::Running);
        }

        #[tokio::test]
        async fn test_malformed_metrics_rejected() {
            let mut bad = winning_metrics();
            bad.treatment.clicks = bad.treatment.impressions + 1;
            let h = harness(
                MockPlatformConnector::new().with_metrics(bad),
                MockExperimentRecordRepository::new().with_record(running_record("EXP_1")),
            );

            let err = h.lifecycle.collect_metrics("EXP_1").await.unwrap_err();

            assert!(matches!(err, DomainError::MalformedMetrics { .. }));
            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert!(record.metrics_history().is_empty());
        }
    }

    mod report {
        use super::*;

        #[tokio::test]
        async fn test_report_saved_and_record_marked() {
            let h = harness(
                MockPlatformConnector::new().with_metrics(winning_metrics()),
                MockExperimentRecordRepository::new().with_record(running_record("EXP_1")),
            );

            let report = h.lifecycle.generate_report("EXP_1").await.unwrap();

            assert_eq!(report.experiment_id.as_str(), "EXP_1");
            assert_eq!(report.recommendation, Recommendation::Apply);
            assert_eq!(report.treatment_title, "Premium Wireless Headphones");
            assert_eq!(report.quality_score, 70.0);
            assert_eq!(h.reports.len(), 1);

            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert_eq!(record.phase(), LifecyclePhase::Reported);
            assert_eq!(record.metrics_history().len(), 1);
        }

        #[tokio::test]
        async fn test_report_can_be_regenerated() {
            let h = harness(
                MockPlatformConnector::new().with_metrics(winning_metrics()),
                MockExperimentRecordRepository::new().with_record(running_record("EXP_1")),
            );

            h.lifecycle.generate_report("EXP_1").await.unwrap();
            h.lifecycle.generate_report("EXP_1").await.unwrap();

            let record = h.lifecycle.get_record("EXP_1").await.unwrap();
            assert_eq!(record.phase(), LifecyclePhase::Reported);
            assert_eq!(record.metrics_history().len(), 2);
        }

        #[tokio::test]
        async fn test_unknown_experiment_is_not_found() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            let err = h.lifecycle.generate_report("EXP_404").await.unwrap_err();

            assert!(err.is_not_found());
            assert_eq!(h.connector.connects(), 0);
            assert_eq!(h.reports.len(), 0);
        }
    }

    mod queries {
        use super::*;

        #[tokio::test]
        async fn test_list_experiments_from_platform() {
            let summary = ExperimentSummary {
                experiment_id: "EXP_1".to_string(),
                asin: "B01TEST".to_string(),
                status: "Running".to_string(),
                created: "2024-05-01".to_string(),
            };
            let h = harness(
                MockPlatformConnector::new().with_summaries(vec![summary.clone()]),
                MockExperimentRecordRepository::new(),
            );

            let listed = h.lifecycle.list_experiments().await.unwrap();

            assert_eq!(listed, vec![summary]);
            assert_eq!(h.connector.closes(), 1);
        }

        #[tokio::test]
        async fn test_list_records_is_local() {
            let h = harness(
                MockPlatformConnector::new(),
                MockExperimentRecordRepository::new()
                    .with_record(running_record("EXP_1"))
                    .with_record(running_record("EXP_2")),
            );

            let records = h.lifecycle.list_records().await.unwrap();

            assert_eq!(records.len(), 2);
            assert_eq!(h.connector.connects(), 0);
        }

        #[tokio::test]
        async fn test_get_missing_record() {
            let h = harness(MockPlatformConnector::new(), MockExperimentRecordRepository::new());

            assert!(h.lifecycle.get_record("EXP_9").await.unwrap_err().is_not_found());
        }
    }
}
