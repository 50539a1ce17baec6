//! Quality scoring for stored and ad-hoc listings

use std::sync::Arc;

use tracing::debug;

use crate::domain::listing::{Asin, ContentStore, ListingContent};
use crate::domain::quality::{EligibilityGate, EligibilityVerdict, QualityScoreResult};
use crate::domain::DomainError;

/// Scores listings from a content store or supplied directly
#[derive(Debug, Clone)]
pub struct QualityService {
    store: Arc<dyn ContentStore>,
    gate: EligibilityGate,
}

impl QualityService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            gate: EligibilityGate::default(),
        }
    }

    pub fn with_gate(mut self, gate: EligibilityGate) -> Self {
        self.gate = gate;
        self
    }

    /// Listing content for an ASIN, `NotFound` when the store has none
    pub async fn load(&self, asin: &Asin) -> Result<ListingContent, DomainError> {
        debug!(asin = %asin, store = self.store.store_name(), "Loading listing content");

        self.store.fetch(asin).await?.ok_or_else(|| {
            DomainError::not_found(format!(
                "No listing content for ASIN '{}' in {} store",
                asin,
                self.store.store_name()
            ))
        })
    }

    pub async fn score_asin(&self, asin: &Asin) -> Result<QualityScoreResult, DomainError> {
        let content = self.load(asin).await?;
        Ok(self.score_content(asin, &content))
    }

    pub async fn validate_asin(&self, asin: &Asin) -> Result<EligibilityVerdict, DomainError> {
        let content = self.load(asin).await?;
        Ok(self.validate_content(asin, &content))
    }

    pub fn score_content(&self, asin: &Asin, content: &ListingContent) -> QualityScoreResult {
        self.gate.engine().score(asin, content)
    }

    pub fn validate_content(&self, asin: &Asin, content: &ListingContent) -> EligibilityVerdict {
        self.gate.validate(asin, content)
    }
}
