//! Listing quality domain
//!
//! Six weighted dimensions produce an overall score; the gate turns that score
//! into an eligibility verdict for experiment creation.

mod dimension;
mod engine;
mod gate;
mod score;

pub use dimension::{DimensionScore, QualityDimension};
pub use engine::{ScoreEngine, MYE_THRESHOLD};
pub use gate::{EligibilityGate, EligibilityVerdict, RECOMMENDATION_FLOOR};
pub use score::{QualityGrade, QualityScoreResult};

pub(crate) use score::round2;

#[cfg(test)]
pub(crate) use engine::fixtures;
