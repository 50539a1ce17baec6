//! Listing content read from a local directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::listing::{Asin, ContentStore, ListingContent};
use crate::domain::DomainError;

/// Reads `{directory}/{prefix}{asin}.json`
#[derive(Debug, Clone)]
pub struct FileContentStore {
    directory: PathBuf,
    prefix: String,
}

impl FileContentStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn path_for(&self, asin: &Asin) -> PathBuf {
        self.directory
            .join(format!("{}{}.json", self.prefix, asin.as_str()))
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn fetch(&self, asin: &Asin) -> Result<Option<ListingContent>, DomainError> {
        let path = self.path_for(asin);
        debug!(asin = %asin, path = %path.display(), "Reading listing content");

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            DomainError::storage(format!("Invalid listing content in {}: {}", path.display(), e))
        })
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
