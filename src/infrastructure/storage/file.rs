//! File-backed JSON storage
//!
//! Each entity is one pretty-printed JSON file named after its key inside a
//! collection directory, e.g. `{root}/records/EXP_1700000000.json`.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

const EXTENSION: &str = "json";

/// Storage that keeps one file per entity
///
/// Writes within a process are serialized by a mutex; there is no locking
/// across processes.
#[derive(Debug)]
pub struct FileStorage<E> {
    directory: PathBuf,
    write_lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> FileStorage<E>
where
    E: StorageEntity,
{
    /// Storage for the `collection` subdirectory of `root`
    pub fn new(root: impl AsRef<Path>, collection: &str) -> Self {
        Self {
            directory: root.as_ref().join(collection),
            write_lock: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", key, EXTENSION))
    }

    async fn read_file(&self, path: &Path) -> Result<Option<E>, DomainError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            DomainError::storage(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    async fn write_file(&self, entity: &E) -> Result<(), DomainError> {
        fs::create_dir_all(&self.directory).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to create {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let content = serde_json::to_string_pretty(entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

        let path = self.path_for(entity.key().as_str());
        fs::write(&path, content).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Wrote entity");
        Ok(())
    }

    async fn entity_paths(&self) -> Result<Vec<PathBuf>, DomainError> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to list {}: {}",
                    self.directory.display(),
                    e
                )));
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entries: {}", e)))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl<E> Storage<E> for FileStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        self.read_file(&self.path_for(key.as_str())).await
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let mut entities = Vec::new();
        for path in self.entity_paths().await? {
            if let Some(entity) = self.read_file(&path).await? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let _guard = self.write_lock.lock().await;

        if fs::try_exists(self.path_for(entity.key().as_str()))
            .await
            .unwrap_or(false)
        {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                entity.key().as_str()
            )));
        }

        self.write_file(&entity).await?;
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let _guard = self.write_lock.lock().await;

        if !fs::try_exists(self.path_for(entity.key().as_str()))
            .await
            .unwrap_or(false)
        {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                entity.key().as_str()
            )));
        }

        self.write_file(&entity).await?;
        Ok(entity)
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        let _guard = self.write_lock.lock().await;
        self.write_file(&entity).await?;
        Ok(entity)
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        fs::try_exists(self.path_for(key.as_str()))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat entity: {}", e)))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.entity_paths().await?.len())
    }
}
