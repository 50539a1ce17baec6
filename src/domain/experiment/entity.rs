//! Experiment domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::analysis::WinnerAnalysis;
use super::metrics::ExperimentMetrics;
use super::validation::{validate_experiment_id, ExperimentValidationError};
use crate::domain::listing::Asin;
use crate::domain::quality::EligibilityVerdict;
use crate::domain::storage::{StorageEntity, StorageKey};

// ============================================================================
// ExperimentId
// ============================================================================

/// Identifier of an experiment on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExperimentId(String);

impl ExperimentId {
    /// Create a new experiment ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, ExperimentValidationError> {
        let id = id.into();
        validate_experiment_id(&id)?;
        Ok(Self(id))
    }

    /// Locally generated ID for when the platform does not report one
    ///
    /// `EXP_<unix-seconds>_<8 hex>`; the random suffix keeps experiments
    /// created within the same second apart.
    pub fn fallback(at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("EXP_{}_{}", at.timestamp(), &suffix[..8]))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExperimentId {
    type Error = ExperimentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExperimentId> for String {
    fn from(id: ExperimentId) -> Self {
        id.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ExperimentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl StorageKey for ExperimentId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ExperimentAttribute
// ============================================================================

/// Listing attribute under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExperimentAttribute {
    #[default]
    #[serde(rename = "TITLE")]
    Title,
    #[serde(rename = "BULLET_1")]
    Bullet1,
    #[serde(rename = "BULLET_2")]
    Bullet2,
    #[serde(rename = "BULLET_3")]
    Bullet3,
    #[serde(rename = "BULLET_4")]
    Bullet4,
    #[serde(rename = "BULLET_5")]
    Bullet5,
}

impl ExperimentAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Bullet1 => "BULLET_1",
            Self::Bullet2 => "BULLET_2",
            Self::Bullet3 => "BULLET_3",
            Self::Bullet4 => "BULLET_4",
            Self::Bullet5 => "BULLET_5",
        }
    }

    /// Label the platform shows for the attribute
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Title => "Product Title",
            Self::Bullet1 => "Bullet Point 1",
            Self::Bullet2 => "Bullet Point 2",
            Self::Bullet3 => "Bullet Point 3",
            Self::Bullet4 => "Bullet Point 4",
            Self::Bullet5 => "Bullet Point 5",
        }
    }

    /// Zero-based bullet slot, `None` for the title
    pub fn bullet_index(&self) -> Option<usize> {
        match self {
            Self::Title => None,
            Self::Bullet1 => Some(0),
            Self::Bullet2 => Some(1),
            Self::Bullet3 => Some(2),
            Self::Bullet4 => Some(3),
            Self::Bullet5 => Some(4),
        }
    }
}

impl fmt::Display for ExperimentAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperimentAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "TITLE" => Ok(Self::Title),
            "BULLET_1" => Ok(Self::Bullet1),
            "BULLET_2" => Ok(Self::Bullet2),
            "BULLET_3" => Ok(Self::Bullet3),
            "BULLET_4" => Ok(Self::Bullet4),
            "BULLET_5" => Ok(Self::Bullet5),
            other => Err(format!("Unknown experiment attribute: {}", other)),
        }
    }
}

// ============================================================================
// ExperimentStatus
// ============================================================================

/// Externally visible status of a run request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentStatus {
    /// Created on the platform and collecting traffic
    Running,
    /// Rejected by the quality gate, never created
    Blocked,
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Blocked => write!(f, "BLOCKED"),
        }
    }
}

// ============================================================================
// LifecyclePhase
// ============================================================================

/// Position of an experiment in the validate, create, monitor, report flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    PendingValidation,
    Blocked,
    Validated,
    Creating,
    Running,
    MetricsCollected,
    Reported,
}

impl LifecyclePhase {
    /// Check if a transition to the target phase is valid
    pub fn can_transition_to(&self, target: LifecyclePhase) -> bool {
        matches!(
            (self, target),
            (Self::PendingValidation, Self::Blocked)
                | (Self::PendingValidation, Self::Validated)
                | (Self::Validated, Self::Creating)
                | (Self::Creating, Self::Running)
                | (Self::Running, Self::MetricsCollected)
                | (Self::MetricsCollected, Self::MetricsCollected)
                | (Self::MetricsCollected, Self::Reported)
                | (Self::Reported, Self::MetricsCollected)
        )
    }

    /// Move to `target` or fail with the attempted transition
    pub fn advance(self, target: LifecyclePhase) -> Result<LifecyclePhase, ExperimentValidationError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(ExperimentValidationError::InvalidPhaseTransition(
                self.to_string(),
                target.to_string(),
            ))
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PendingValidation => "pending_validation",
            Self::Blocked => "blocked",
            Self::Validated => "validated",
            Self::Creating => "creating",
            Self::Running => "running",
            Self::MetricsCollected => "metrics_collected",
            Self::Reported => "reported",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// MetricsEntry
// ============================================================================

/// One metrics pull and its analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub collected_at: DateTime<Utc>,
    pub metrics: ExperimentMetrics,
    pub analysis: WinnerAnalysis,
}

impl MetricsEntry {
    pub fn new(metrics: ExperimentMetrics, analysis: WinnerAnalysis) -> Self {
        Self {
            collected_at: Utc::now(),
            metrics,
            analysis,
        }
    }
}

// ============================================================================
// ExperimentRecord
// ============================================================================

/// Local record of an experiment created on the platform
///
/// Only exists for experiments that passed the gate and were created; the
/// metrics history is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    experiment_id: ExperimentId,
    asin: Asin,
    #[serde(default)]
    attribute: ExperimentAttribute,
    control_text: String,
    treatment_text: String,
    duration_days: u32,
    traffic_split: u8,
    created_at: DateTime<Utc>,
    status: ExperimentStatus,
    phase: LifecyclePhase,
    verdict: EligibilityVerdict,
    #[serde(default)]
    metrics_history: Vec<MetricsEntry>,
}

impl ExperimentRecord {
    /// Record for a freshly created, running experiment
    pub fn new(
        experiment_id: ExperimentId,
        asin: Asin,
        verdict: EligibilityVerdict,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            experiment_id,
            asin,
            attribute: ExperimentAttribute::Title,
            control_text: String::new(),
            treatment_text: String::new(),
            duration_days: 0,
            traffic_split: 50,
            created_at,
            status: ExperimentStatus::Running,
            phase: LifecyclePhase::Running,
            verdict,
            metrics_history: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: ExperimentAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_variants(
        mut self,
        control_text: impl Into<String>,
        treatment_text: impl Into<String>,
    ) -> Self {
        self.control_text = control_text.into();
        self.treatment_text = treatment_text.into();
        self
    }

    pub fn with_schedule(mut self, duration_days: u32, traffic_split: u8) -> Self {
        self.duration_days = duration_days;
        self.traffic_split = traffic_split;
        self
    }

    // Getters

    pub fn experiment_id(&self) -> &ExperimentId {
        &self.experiment_id
    }

    pub fn asin(&self) -> &Asin {
        &self.asin
    }

    pub fn attribute(&self) -> ExperimentAttribute {
        self.attribute
    }

    pub fn control_text(&self) -> &str {
        &self.control_text
    }

    pub fn treatment_text(&self) -> &str {
        &self.treatment_text
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn traffic_split(&self) -> u8 {
        self.traffic_split
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> ExperimentStatus {
        self.status
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn verdict(&self) -> &EligibilityVerdict {
        &self.verdict
    }

    pub fn metrics_history(&self) -> &[MetricsEntry] {
        &self.metrics_history
    }

    pub fn latest_metrics(&self) -> Option<&MetricsEntry> {
        self.metrics_history.last()
    }

    // State changes

    /// Append a metrics pull and move to `MetricsCollected`
    pub fn record_metrics(&mut self, entry: MetricsEntry) -> Result<(), ExperimentValidationError> {
        self.phase = self.phase.advance(LifecyclePhase::MetricsCollected)?;
        self.metrics_history.push(entry);
        Ok(())
    }

    /// Mark that a report was generated from the latest metrics
    pub fn mark_reported(&mut self) -> Result<(), ExperimentValidationError> {
        self.phase = self.phase.advance(LifecyclePhase::Reported)?;
        Ok(())
    }
}

impl StorageEntity for ExperimentRecord {
    type Key = ExperimentId;

    fn key(&self) -> &Self::Key {
        &self.experiment_id
    }
}
