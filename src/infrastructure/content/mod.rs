//! Content stores for pre-generated listings

mod file_store;
mod s3_store;

pub use file_store::FileContentStore;
pub use s3_store::{S3ContentConfig, S3ContentStore};
