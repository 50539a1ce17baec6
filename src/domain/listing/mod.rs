//! Listing domain module
//!
//! Product identifiers, the listing content that gets scored, and the store
//! abstraction for pre-generated listings.

mod content;
mod store;

pub use content::{Asin, ListingContent, MAX_ASIN_LENGTH};
pub use store::ContentStore;

#[cfg(test)]
pub use store::MockContentStore;
