//! Winner analysis for collected experiment metrics

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;

use super::metrics::VariantMetrics;
use crate::domain::quality::round2;
use crate::domain::DomainError;

/// Both arms need at least this many impressions for more than low confidence
const LOW_VOLUME_IMPRESSIONS: u64 = 100;

/// Both arms at or above this many impressions give high confidence
const HIGH_VOLUME_IMPRESSIONS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Control,
    Treatment,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "CONTROL"),
            Self::Treatment => write!(f, "TREATMENT"),
        }
    }
}

/// What to do with the treatment once the experiment is analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Apply,
    Rollback,
}

impl From<Winner> for Recommendation {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::Treatment => Self::Apply,
            Winner::Control => Self::Rollback,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => write!(f, "APPLY"),
            Self::Rollback => write!(f, "ROLLBACK"),
        }
    }
}

/// Traffic-volume bucket
///
/// This is a sample-size heuristic, not a significance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_impressions(control: u64, treatment: u64) -> Self {
        if control < LOW_VOLUME_IMPRESSIONS || treatment < LOW_VOLUME_IMPRESSIONS {
            Self::Low
        } else if control >= HIGH_VOLUME_IMPRESSIONS && treatment >= HIGH_VOLUME_IMPRESSIONS {
            Self::High
        } else {
            Self::Medium
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Result of comparing treatment against control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinnerAnalysis {
    pub winner: Winner,
    pub ctr_lift_percent: f64,
    pub cvr_lift_percent: f64,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
}

// ============================================================================
// WinnerPolicy
// ============================================================================

/// Relative change of treatment over control, unrounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifts {
    pub ctr: f64,
    pub cvr: f64,
}

impl Lifts {
    pub fn between(control: &VariantMetrics, treatment: &VariantMetrics) -> Self {
        Self {
            ctr: lift(control.ctr, treatment.ctr),
            cvr: lift(control.cvr, treatment.cvr),
        }
    }
}

/// Decides which arm wins given the lifts
pub trait WinnerPolicy: Send + Sync + Debug {
    fn choose(&self, lifts: &Lifts) -> Winner;
}

/// Treatment wins only when click-through improves without hurting conversion
///
/// A control with zero click-through yields zero lift and so always keeps the
/// control, even if the treatment got clicks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickThroughFirstPolicy;

impl WinnerPolicy for ClickThroughFirstPolicy {
    fn choose(&self, lifts: &Lifts) -> Winner {
        if lifts.ctr > 0.0 && lifts.cvr >= 0.0 {
            Winner::Treatment
        } else {
            Winner::Control
        }
    }
}

// ============================================================================
// MetricsAnalyzer
// ============================================================================

/// Stateless comparison of two arms
#[derive(Debug, Clone)]
pub struct MetricsAnalyzer {
    policy: Arc<dyn WinnerPolicy>,
}

impl Default for MetricsAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(ClickThroughFirstPolicy))
    }
}

impl MetricsAnalyzer {
    pub fn new(policy: Arc<dyn WinnerPolicy>) -> Self {
        Self { policy }
    }

    /// Compare treatment against control
    ///
    /// Lifts are rounded to two decimals for output only; the policy sees the
    /// unrounded values.
    pub fn analyze(
        &self,
        control: &VariantMetrics,
        treatment: &VariantMetrics,
    ) -> Result<WinnerAnalysis, DomainError> {
        control.validate("control")?;
        treatment.validate("treatment")?;

        let lifts = Lifts::between(control, treatment);
        let winner = self.policy.choose(&lifts);

        Ok(WinnerAnalysis {
            winner,
            ctr_lift_percent: round2(lifts.ctr),
            cvr_lift_percent: round2(lifts.cvr),
            recommendation: winner.into(),
            confidence: Confidence::from_impressions(control.impressions, treatment.impressions),
        })
    }
}

fn lift(control: f64, treatment: f64) -> f64 {
    if control > 0.0 {
        (treatment - control) / control * 100.0
    } else {
        0.0
    }
}
