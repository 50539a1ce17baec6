//! Listing content and product identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::storage::StorageKey;
use crate::domain::DomainError;

/// Maximum length for an ASIN
pub const MAX_ASIN_LENGTH: usize = 20;

// ============================================================================
// Asin
// ============================================================================

/// Opaque product identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asin(String);

impl Asin {
    /// Create a new ASIN with validation
    pub fn new(asin: impl Into<String>) -> Result<Self, DomainError> {
        let asin = asin.into();

        if asin.is_empty() {
            return Err(DomainError::invalid_id("ASIN cannot be empty"));
        }

        if asin.len() > MAX_ASIN_LENGTH {
            return Err(DomainError::invalid_id(format!(
                "ASIN exceeds maximum length of {} characters",
                MAX_ASIN_LENGTH
            )));
        }

        if let Some(ch) = asin.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(DomainError::invalid_id(format!(
                "ASIN contains invalid character: '{}'",
                ch
            )));
        }

        Ok(Self(asin))
    }

    /// Get the ASIN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Asin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Asin> for String {
    fn from(asin: Asin) -> Self {
        asin.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Asin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl StorageKey for Asin {
    fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ListingContent
// ============================================================================

/// The scored parts of a product listing
///
/// Built once and never mutated; the builder methods consume `self`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingContent {
    title: String,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default)]
    description: String,
}

impl ListingContent {
    /// Create content with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
            description: String::new(),
        }
    }

    /// Title-only content, as used by single-attribute title experiments
    pub fn title_only(title: impl Into<String>) -> Self {
        Self::new(title)
    }

    /// Set the bullet points
    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Title length in characters
    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    /// Combined bullet length in characters
    pub fn bullets_len(&self) -> usize {
        self.bullets.iter().map(|b| b.chars().count()).sum()
    }
}
