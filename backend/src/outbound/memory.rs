//! In-memory adapter for the [`EntityStore`] port.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ConfigurableEntity;
use crate::domain::ports::{EntityStore, EntityStoreError};

/// Entity store holding the collection in process memory.
///
/// Starts empty (`load` returns `None`) unless created with
/// [`InMemoryEntityStore::with_entities`].
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: Mutex<Option<Vec<ConfigurableEntity>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: Vec<ConfigurableEntity>) -> Self {
        Self {
            entities: Mutex::new(Some(entities)),
        }
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn load(&self) -> Result<Option<Vec<ConfigurableEntity>>, EntityStoreError> {
        Ok(self.entities.lock().await.clone())
    }

    async fn replace_all(&self, entities: &[ConfigurableEntity]) -> Result<(), EntityStoreError> {
        *self.entities.lock().await = Some(entities.to_vec());
        Ok(())
    }
}
