//! Storage factory for runtime storage selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::storage::{Storage, StorageEntity};

use super::file::FileStorage;
use super::in_memory::InMemoryStorage;

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for tests and dry runs)
    InMemory,
    /// One JSON file per entity
    File,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "file" | "json" | "fs" => Some(Self::File),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    /// Root directory; each collection gets a subdirectory
    File(PathBuf),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn file(directory: impl Into<PathBuf>) -> Self {
        Self::File(directory.into())
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::File(_) => StorageType::File,
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates the storage for one collection of entities
    pub fn create<E>(config: &StorageConfig, collection: &str) -> Arc<dyn Storage<E>>
    where
        E: StorageEntity + 'static,
    {
        match config {
            StorageConfig::InMemory => Arc::new(InMemoryStorage::<E>::new()),
            StorageConfig::File(root) => Arc::new(FileStorage::<E>::new(root, collection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::fixtures::{key, note, Note};
    use tempfile::tempdir;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(StorageType::from_str("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("in-memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str("FILE"), Some(StorageType::File));
        assert_eq!(StorageType::from_str("json"), Some(StorageType::File));
        assert_eq!(StorageType::from_str("postgres"), None);
    }

    #[test]
    fn test_storage_config_types() {
        assert_eq!(StorageConfig::in_memory().storage_type(), StorageType::InMemory);
        assert_eq!(StorageConfig::file("data").storage_type(), StorageType::File);
    }

    #[tokio::test]
    async fn test_file_collections_are_separate() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::file(dir.path());

        let records = StorageFactory::create::<Note>(&config, "records");
        let reports = StorageFactory::create::<Note>(&config, "reports");

        records.save(note("EXP_1", "record", 1)).await.unwrap();

        assert!(records.exists(&key("EXP_1")).await.unwrap());
        assert!(!reports.exists(&key("EXP_1")).await.unwrap());
        assert!(dir.path().join("records").join("EXP_1.json").exists());
    }
}
