//! Experiment validation utilities

use thiserror::Error;

/// Maximum length for experiment IDs
pub const MAX_EXPERIMENT_ID_LENGTH: usize = 128;

/// Maximum length for a variant's text
pub const MAX_VARIANT_TEXT_LENGTH: usize = 2000;

/// Characters that would change the meaning of a storage path or URL path
const RESERVED_ID_CHARACTERS: [char; 5] = ['/', '\\', '?', '#', '%'];

/// Validation errors for experiments and run requests
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExperimentValidationError {
    #[error("Experiment ID cannot be empty")]
    EmptyId,

    #[error("Experiment ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Experiment ID contains invalid character: {0:?}")]
    InvalidIdCharacter(char),

    #[error("Experiment ID cannot contain '..'")]
    ParentReference,

    #[error("{0} text cannot be empty")]
    EmptyVariantText(&'static str),

    #[error("{0} text exceeds maximum length of {1} characters")]
    VariantTextTooLong(&'static str, usize),

    #[error("Duration must be at least 1 day, got {0}")]
    InvalidDuration(u32),

    #[error("Traffic split must be between 1 and 99 percent, got {0}")]
    InvalidTrafficSplit(u8),

    #[error("Invalid lifecycle transition from {0} to {1}")]
    InvalidPhaseTransition(String, String),
}

/// Validate an experiment ID
///
/// IDs are assigned by the platform, so any printable text is accepted as
/// long as it stays a single storage key and a single URL path segment.
pub fn validate_experiment_id(id: &str) -> Result<(), ExperimentValidationError> {
    if id.is_empty() {
        return Err(ExperimentValidationError::EmptyId);
    }

    if id.len() > MAX_EXPERIMENT_ID_LENGTH {
        return Err(ExperimentValidationError::IdTooLong(MAX_EXPERIMENT_ID_LENGTH));
    }

    if let Some(ch) = id
        .chars()
        .find(|c| c.is_control() || c.is_whitespace() || RESERVED_ID_CHARACTERS.contains(c))
    {
        return Err(ExperimentValidationError::InvalidIdCharacter(ch));
    }

    if id.contains("..") {
        return Err(ExperimentValidationError::ParentReference);
    }

    Ok(())
}

/// Validate the text of one experiment arm
pub fn validate_variant_text(
    label: &'static str,
    text: &str,
) -> Result<(), ExperimentValidationError> {
    if text.trim().is_empty() {
        return Err(ExperimentValidationError::EmptyVariantText(label));
    }

    if text.chars().count() > MAX_VARIANT_TEXT_LENGTH {
        return Err(ExperimentValidationError::VariantTextTooLong(
            label,
            MAX_VARIANT_TEXT_LENGTH,
        ));
    }

    Ok(())
}

pub fn validate_duration(days: u32) -> Result<(), ExperimentValidationError> {
    if days == 0 {
        return Err(ExperimentValidationError::InvalidDuration(days));
    }
    Ok(())
}

/// Percentage of traffic kept on the control arm; treatment gets the rest
pub fn validate_traffic_split(split: u8) -> Result<(), ExperimentValidationError> {
    if !(1..=99).contains(&split) {
        return Err(ExperimentValidationError::InvalidTrafficSplit(split));
    }
    Ok(())
}
