//! Quality dimensions and their weights

use serde::{Deserialize, Serialize};
use std::fmt;

/// One axis of the listing quality score
///
/// Declaration order is significant: recommendations and serialized maps
/// follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    KeywordOptimization,
    UspEffectiveness,
    Readability,
    CompetitivePosition,
    CustomerAlignment,
    Compliance,
}

impl QualityDimension {
    /// All dimensions in declaration order
    pub const ALL: [QualityDimension; 6] = [
        Self::KeywordOptimization,
        Self::UspEffectiveness,
        Self::Readability,
        Self::CompetitivePosition,
        Self::CustomerAlignment,
        Self::Compliance,
    ];

    /// Fixed weight of this dimension in the overall score
    pub fn weight(&self) -> f64 {
        match self {
            Self::KeywordOptimization => 0.25,
            Self::UspEffectiveness => 0.20,
            Self::Readability => 0.15,
            Self::CompetitivePosition => 0.15,
            Self::CustomerAlignment => 0.15,
            Self::Compliance => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordOptimization => "keyword_optimization",
            Self::UspEffectiveness => "usp_effectiveness",
            Self::Readability => "readability",
            Self::CompetitivePosition => "competitive_position",
            Self::CustomerAlignment => "customer_alignment",
            Self::Compliance => "compliance",
        }
    }

    /// Human-readable name: underscores to spaces, each word capitalized
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for QualityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score of a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: QualityDimension,
    pub weight: f64,
    /// 0.0 - 100.0
    pub score: f64,
}

impl DimensionScore {
    /// Create a score for a dimension, clamped to [0, 100]
    pub fn new(dimension: QualityDimension, score: f64) -> Self {
        Self {
            dimension,
            weight: dimension.weight(),
            score: score.clamp(0.0, 100.0),
        }
    }

    /// Contribution to the overall score
    pub fn weighted(&self) -> f64 {
        self.score * self.weight
    }
}
