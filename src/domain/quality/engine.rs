//! Listing quality score engine

use std::collections::BTreeMap;

use super::dimension::{DimensionScore, QualityDimension};
use super::score::{round1, QualityGrade, QualityScoreResult};
use crate::domain::listing::{Asin, ListingContent};

/// Minimum overall score for a listing to enter an experiment
pub const MYE_THRESHOLD: f64 = 70.0;

const USP_WORDS: [&str; 6] = ["unique", "patented", "exclusive", "only", "first", "proven"];

const BENEFIT_WORDS: [&str; 6] = ["solve", "eliminate", "prevent", "avoid", "reduce", "improve"];

const BANNED_PHRASES: [&str; 4] = ["#1", "best seller", "free shipping", "100% guarantee"];

/// Baseline when no competitor data is available
const COMPETITIVE_BASELINE: f64 = 70.0;

/// Pure, deterministic listing scorer
///
/// Holds only the eligibility threshold; `score` never performs I/O and is
/// safe to call from any number of tasks.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine {
    threshold: f64,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self {
            threshold: MYE_THRESHOLD,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a listing across all dimensions
    pub fn score(&self, asin: &Asin, content: &ListingContent) -> QualityScoreResult {
        let dimensions: BTreeMap<QualityDimension, DimensionScore> = QualityDimension::ALL
            .iter()
            .map(|&dimension| {
                let raw = Self::score_dimension(dimension, content);
                (dimension, DimensionScore::new(dimension, raw))
            })
            .collect();

        let overall = round1(dimensions.values().map(DimensionScore::weighted).sum());

        QualityScoreResult {
            asin: asin.clone(),
            overall,
            eligible: overall >= self.threshold,
            grade: QualityGrade::from_score(overall),
            dimensions,
        }
    }

    fn score_dimension(dimension: QualityDimension, content: &ListingContent) -> f64 {
        match dimension {
            QualityDimension::KeywordOptimization => Self::keyword_optimization(content),
            QualityDimension::UspEffectiveness => {
                let hits = Self::bullet_hits(content.bullets(), &USP_WORDS);
                (hits as f64 * 20.0 + 40.0).min(100.0)
            }
            QualityDimension::Readability => Self::readability(content.title()),
            QualityDimension::CompetitivePosition => COMPETITIVE_BASELINE,
            QualityDimension::CustomerAlignment => {
                let hits = Self::bullet_hits(content.bullets(), &BENEFIT_WORDS);
                (hits as f64 * 15.0 + 40.0).min(100.0)
            }
            QualityDimension::Compliance => Self::compliance(content),
        }
    }

    fn keyword_optimization(content: &ListingContent) -> f64 {
        let mut score: f64 = 0.0;

        let title_len = content.title_len();
        if title_len > 80 && title_len <= 200 {
            score += 50.0;
        }

        if content.bullets_len() > 500 {
            score += 50.0;
        }

        score.min(100.0)
    }

    fn readability(title: &str) -> f64 {
        let mut score: f64 = 70.0;

        let title_len = title.chars().count();
        if (100..=180).contains(&title_len) {
            score += 15.0;
        }

        if title.contains(['|', ',', '-']) {
            score += 15.0;
        }

        score.min(100.0)
    }

    fn compliance(content: &ListingContent) -> f64 {
        let text = format!("{} {}", content.title(), content.bullets().join(" ")).to_lowercase();

        match BANNED_PHRASES.iter().filter(|p| text.contains(*p)).count() {
            0 => 100.0,
            1 => 80.0,
            _ => 60.0,
        }
    }

    /// Count (bullet, word) pairs where the lowercased bullet contains the word
    fn bullet_hits(bullets: &[String], words: &[&str]) -> usize {
        bullets
            .iter()
            .map(|bullet| {
                let lower = bullet.to_lowercase();
                words.iter().filter(|w| lower.contains(*w)).count()
            })
            .sum()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn asin() -> Asin {
        Asin::new("B01TEST").unwrap()
    }

    #[test]
    fn test_weak_listing_score() {
        let result = ScoreEngine::new().score(&asin(), &weak_listing());

        assert_eq!(result.overall, 45.0);
        assert_eq!(result.grade, QualityGrade::F);
        assert!(!result.eligible);
        assert_eq!(result.dimension_score(QualityDimension::KeywordOptimization), 0.0);
        assert_eq!(result.dimension_score(QualityDimension::UspEffectiveness), 40.0);
        assert_eq!(result.dimension_score(QualityDimension::Readability), 70.0);
        assert_eq!(result.dimension_score(QualityDimension::CompetitivePosition), 70.0);
        assert_eq!(result.dimension_score(QualityDimension::CustomerAlignment), 40.0);
        assert_eq!(result.dimension_score(QualityDimension::Compliance), 100.0);
    }

    #[test]
    fn test_rich_listing_scores_grade_a() {
        let result = ScoreEngine::new().score(&asin(), &rich_listing());

        assert_eq!(result.overall, 95.5);
        assert_eq!(result.grade, QualityGrade::A);
        assert!(result.eligible);
        assert_eq!(result.dimension_score(QualityDimension::KeywordOptimization), 100.0);
        assert_eq!(result.dimension_score(QualityDimension::UspEffectiveness), 100.0);
        assert_eq!(result.dimension_score(QualityDimension::CustomerAlignment), 100.0);
    }

    #[test]
    fn test_exact_threshold_is_eligible() {
        let result = ScoreEngine::new().score(&asin(), &threshold_listing());

        assert_eq!(result.overall, 70.0);
        assert_eq!(result.grade, QualityGrade::C);
        assert!(result.eligible);
    }

    #[test]
    fn test_below_threshold_is_not_eligible() {
        let result = ScoreEngine::new().score(&asin(), &near_miss_listing());

        assert_eq!(result.overall, 66.0);
        assert_eq!(result.grade, QualityGrade::D);
        assert!(!result.eligible);
    }

    #[test]
    fn test_title_only_listing_never_eligible() {
        let result = ScoreEngine::new().score(&asin(), &ListingContent::title_only(STRONG_TITLE));

        assert_eq!(result.overall, 62.0);
        assert!(!result.eligible);
    }

    #[test]
    fn test_banned_phrases_lower_compliance() {
        let content = ListingContent::new("#1 Best Seller Headphones with Free Shipping");
        let result = ScoreEngine::new().score(&asin(), &content);

        assert_eq!(result.dimension_score(QualityDimension::Compliance), 60.0);
        assert_eq!(result.overall, 41.0);

        let one_phrase = ListingContent::new("Headphones").with_bullets(["100% GUARANTEE on parts"]);
        let result = ScoreEngine::new().score(&asin(), &one_phrase);
        assert_eq!(result.dimension_score(QualityDimension::Compliance), 80.0);
    }

    #[test]
    fn test_keyword_words_counted_per_bullet() {
        let content = ListingContent::new("Headphones")
            .with_bullets(["The only unique pair", "Unique again", "nothing here"]);
        let result = ScoreEngine::new().score(&asin(), &content);

        // "only" + "unique" in the first bullet, "unique" in the second
        assert_eq!(result.dimension_score(QualityDimension::UspEffectiveness), 100.0);

        let content = ListingContent::new("Headphones").with_bullets(["UNIQUE"]);
        let result = ScoreEngine::new().score(&asin(), &content);
        assert_eq!(result.dimension_score(QualityDimension::UspEffectiveness), 60.0);
    }

    #[test]
    fn test_title_length_bounds() {
        let at_bound = ListingContent::new("a".repeat(200));
        let over = ListingContent::new("a".repeat(201));
        let engine = ScoreEngine::new();

        assert_eq!(
            engine
                .score(&asin(), &at_bound)
                .dimension_score(QualityDimension::KeywordOptimization),
            50.0
        );
        assert_eq!(
            engine
                .score(&asin(), &over)
                .dimension_score(QualityDimension::KeywordOptimization),
            0.0
        );
    }

    #[test]
    fn test_score_is_deterministic() {
        let engine = ScoreEngine::new();
        let first = engine.score(&asin(), &rich_listing());
        let second = engine.score(&asin(), &rich_listing());
        assert_eq!(first, second);
    }

    #[test]
    fn test_overall_within_bounds() {
        let engine = ScoreEngine::new();
        let corpus = vec![
            ListingContent::default(),
            weak_listing(),
            near_miss_listing(),
            threshold_listing(),
            rich_listing(),
            ListingContent::new("x".repeat(5000)).with_bullets(vec!["unique ".repeat(500); 20]),
            ListingContent::new("#1 best seller free shipping 100% guarantee"),
        ];

        for content in corpus {
            let result = engine.score(&asin(), &content);
            assert!((0.0..=100.0).contains(&result.overall));
            assert_eq!(result.dimensions.len(), QualityDimension::ALL.len());
        }
    }
}
