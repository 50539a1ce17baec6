//! In-memory storage implementation

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Used for tests and dry runs. Data is lost when the process terminates.
/// Entities are kept ordered by key so `list` is deterministic.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<BTreeMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates storage pre-populated with entities
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().as_str().to_string(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::internal(format!("Storage lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::internal(format!("Storage lock poisoned: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read()?.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write()?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write()?;

        match entities.get_mut(&key) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            ))),
        }
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        self.write()?
            .insert(entity.key().as_str().to_string(), entity.clone());
        Ok(entity)
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::fixtures::{key, note, Note};

    #[tokio::test]
    async fn test_create_and_get() {
        let storage: InMemoryStorage<Note> = InMemoryStorage::new();

        storage.create(note("EXP_1", "first", 1)).await.unwrap();

        let result = storage.get(&key("EXP_1")).await.unwrap();
        assert_eq!(result, Some(note("EXP_1", "first", 1)));
        assert_eq!(storage.get(&key("EXP_2")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage: InMemoryStorage<Note> = InMemoryStorage::new();

        storage.create(note("EXP_1", "first", 1)).await.unwrap();
        let result = storage.create(note("EXP_1", "second", 2)).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let storage: InMemoryStorage<Note> = InMemoryStorage::new();

        let result = storage.update(note("EXP_1", "first", 1)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let storage: InMemoryStorage<Note> = InMemoryStorage::new();

        storage.save(note("EXP_1", "first", 1)).await.unwrap();
        storage.save(note("EXP_1", "second", 2)).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        let stored = storage.get(&key("EXP_1")).await.unwrap().unwrap();
        assert_eq!(stored.revision, 2);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_key() {
        let storage = InMemoryStorage::with_entities(vec![
            note("c", "C", 3),
            note("a", "A", 1),
            note("b", "B", 2),
        ]);

        let ids: Vec<_> = storage
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id.0)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_exists_and_count() {
        let storage = InMemoryStorage::with_entities(vec![note("a", "A", 1), note("b", "B", 2)]);

        assert!(storage.exists(&key("a")).await.unwrap());
        assert!(!storage.exists(&key("z")).await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 2);
    }
}
