//! Per-variant performance counters

use serde::{Deserialize, Serialize};

use crate::domain::quality::round2;
use crate::domain::DomainError;

/// Rates reported by the platform may be off by rounding
const RATE_TOLERANCE: f64 = 0.01;

/// Counters and derived rates for one experiment arm
///
/// Deserialization reads only the counters; any rates in the payload are
/// recomputed from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VariantCounts")]
pub struct VariantMetrics {
    pub impressions: u64,
    pub clicks: u64,
    /// Click-through rate in percent
    pub ctr: f64,
    pub units_ordered: u64,
    /// Conversion rate in percent
    pub cvr: f64,
}

impl VariantMetrics {
    /// Build metrics from raw counters, deriving both rates
    pub fn from_counts(impressions: u64, clicks: u64, units_ordered: u64) -> Self {
        Self {
            impressions,
            clicks,
            ctr: percent(clicks, impressions),
            units_ordered,
            cvr: percent(units_ordered, clicks),
        }
    }

    /// Check the funnel ordering (units <= clicks <= impressions) and that
    /// both rates match the counters
    pub fn validate(&self, label: &str) -> Result<(), DomainError> {
        if self.clicks > self.impressions {
            return Err(DomainError::malformed_metrics(format!(
                "{} has {} clicks but only {} impressions",
                label, self.clicks, self.impressions
            )));
        }

        if self.units_ordered > self.clicks {
            return Err(DomainError::malformed_metrics(format!(
                "{} has {} units ordered but only {} clicks",
                label, self.units_ordered, self.clicks
            )));
        }

        check_rate(label, "ctr", self.ctr, percent(self.clicks, self.impressions))?;
        check_rate(label, "cvr", self.cvr, percent(self.units_ordered, self.clicks))
    }
}

/// Raw counters as sent by the platform
#[derive(Debug, Deserialize)]
struct VariantCounts {
    impressions: u64,
    clicks: u64,
    units_ordered: u64,
}

impl From<VariantCounts> for VariantMetrics {
    fn from(counts: VariantCounts) -> Self {
        Self::from_counts(counts.impressions, counts.clicks, counts.units_ordered)
    }
}

/// Both arms of an experiment as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetrics {
    pub control: VariantMetrics,
    pub treatment: VariantMetrics,
}

impl ExperimentMetrics {
    pub fn new(control: VariantMetrics, treatment: VariantMetrics) -> Self {
        Self { control, treatment }
    }
}

fn check_rate(label: &str, name: &str, actual: f64, expected: f64) -> Result<(), DomainError> {
    if !actual.is_finite() || (actual - expected).abs() > RATE_TOLERANCE {
        return Err(DomainError::malformed_metrics(format!(
            "{} reports {} {} but its counts give {}",
            label, name, actual, expected
        )));
    }
    Ok(())
}

fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}
