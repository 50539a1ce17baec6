//! Quality score results and grades

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::dimension::{DimensionScore, QualityDimension};
use crate::domain::listing::Asin;

/// Letter grade derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    F,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of scoring one listing
///
/// Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScoreResult {
    pub asin: Asin,
    /// Weighted sum rounded to one decimal
    pub overall: f64,
    pub dimensions: BTreeMap<QualityDimension, DimensionScore>,
    pub eligible: bool,
    pub grade: QualityGrade,
}

impl QualityScoreResult {
    /// Score for a single dimension, 0.0 if it was not computed
    pub fn dimension_score(&self, dimension: QualityDimension) -> f64 {
        self.dimensions
            .get(&dimension)
            .map(|d| d.score)
            .unwrap_or(0.0)
    }

    /// Dimensions scoring strictly below `floor`, in declaration order
    pub fn weak_dimensions(&self, floor: f64) -> impl Iterator<Item = &DimensionScore> {
        self.dimensions.values().filter(move |d| d.score < floor)
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
