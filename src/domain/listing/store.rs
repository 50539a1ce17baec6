//! Content store trait for pre-generated listings

use async_trait::async_trait;

use super::content::{Asin, ListingContent};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read-only source of generated listing content keyed by ASIN
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Fetch the listing for an ASIN, `None` if the store has no entry
    async fn fetch(&self, asin: &Asin) -> Result<Option<ListingContent>, DomainError>;

    /// Backend name for logging
    fn store_name(&self) -> &'static str;
}
