//! Values exchanged with the experiment platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::experiment::ExperimentAttribute;
use crate::domain::listing::Asin;

/// Everything the platform needs to create an experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExperimentParams {
    pub asin: Asin,
    pub attribute: ExperimentAttribute,
    pub control_text: String,
    pub treatment_text: String,
    pub duration_days: u32,
    /// Control share of traffic in percent
    pub traffic_split: u8,
}

/// What the platform reports back after creation
///
/// The platform does not always surface an id; the caller generates one
/// when it is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    #[serde(default)]
    pub experiment_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the platform's experiment list
///
/// Free-form strings as shown by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub experiment_id: String,
    #[serde(default)]
    pub asin: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_without_id() {
        let metadata: ExperimentMetadata = serde_json::from_str("{}").unwrap();
        assert!(metadata.experiment_id.is_none());
        assert!(metadata.created_at.is_none());
    }

    #[test]
    fn test_params_wire_format() {
        let params = CreateExperimentParams {
            asin: Asin::new("B01TEST").unwrap(),
            attribute: ExperimentAttribute::Title,
            control_text: "Old".to_string(),
            treatment_text: "New".to_string(),
            duration_days: 28,
            traffic_split: 50,
        };

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["asin"], "B01TEST");
        assert_eq!(json["attribute"], "TITLE");
        assert_eq!(json["traffic_split"], 50);
    }

    #[test]
    fn test_summary_tolerates_missing_columns() {
        let summary: ExperimentSummary =
            serde_json::from_str(r#"{"experiment_id": "EXP_1"}"#).unwrap();
        assert_eq!(summary.experiment_id, "EXP_1");
        assert_eq!(summary.status, "");
    }
}
