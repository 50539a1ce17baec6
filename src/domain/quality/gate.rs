//! Eligibility gate for experiment creation

use serde::{Deserialize, Serialize};

use super::engine::ScoreEngine;
use super::score::QualityScoreResult;
use crate::domain::listing::{Asin, ListingContent};

/// Dimensions scoring below this get a recommendation
pub const RECOMMENDATION_FLOOR: f64 = 60.0;

/// Pass/fail decision with human-readable reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub score: QualityScoreResult,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl EligibilityVerdict {
    pub fn overall(&self) -> f64 {
        self.score.overall
    }
}

/// Applies the threshold policy to a score
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityGate {
    engine: ScoreEngine,
}

impl EligibilityGate {
    pub fn new(engine: ScoreEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }

    /// Score the listing once and explain the result
    pub fn validate(&self, asin: &Asin, content: &ListingContent) -> EligibilityVerdict {
        let score = self.engine.score(asin, content);
        let threshold = self.engine.threshold();

        let mut blockers = Vec::new();
        if score.overall < threshold {
            blockers.push(format!(
                "LQS score {:.1} below MYE threshold {:.1}",
                score.overall, threshold
            ));
        }

        let recommendations = score
            .weak_dimensions(RECOMMENDATION_FLOOR)
            .map(|d| {
                format!(
                    "Improve {}: score {}/100",
                    d.dimension.display_name(),
                    d.score
                )
            })
            .collect();

        EligibilityVerdict {
            eligible: score.eligible,
            score,
            blockers,
            recommendations,
        }
    }
}
