//! JSON file adapter for the [`EntityStore`] port.
//!
//! The collection lives in a single file inside a capability directory and
//! is replaced atomically on every write. Filesystem access is synchronous;
//! collections are small and the settings binary runs on a current-thread
//! runtime.

mod atomic;
mod envelope;

use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::ConfigurableEntity;
use crate::domain::ports::{EntityStore, EntityStoreError};

pub use envelope::SUPPORTED_VERSION;

/// Entity store backed by one JSON file.
#[derive(Debug)]
pub struct JsonFileEntityStore {
    dir: Dir,
    file_name: Utf8PathBuf,
}

impl JsonFileEntityStore {
    /// Use `file_name` inside an already opened directory.
    pub fn new(dir: Dir, file_name: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir,
            file_name: file_name.into(),
        }
    }

    /// Open (creating if needed) `store_dir` and use `file_name` inside it.
    pub fn open(store_dir: &Utf8Path, file_name: &Utf8Path) -> Result<Self, EntityStoreError> {
        Dir::create_ambient_dir_all(store_dir, ambient_authority()).map_err(|err| {
            EntityStoreError::connection(format!("cannot create {store_dir}: {err}"))
        })?;
        let dir = Dir::open_ambient_dir(store_dir, ambient_authority()).map_err(|err| {
            EntityStoreError::connection(format!("cannot open {store_dir}: {err}"))
        })?;
        Ok(Self::new(dir, file_name))
    }

    pub fn file_name(&self) -> &Utf8Path {
        &self.file_name
    }
}

#[async_trait]
impl EntityStore for JsonFileEntityStore {
    async fn load(&self) -> Result<Option<Vec<ConfigurableEntity>>, EntityStoreError> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file = %self.file_name, "entity store file missing");
                return Ok(None);
            }
            Err(err) => {
                return Err(EntityStoreError::read(format!(
                    "{}: {err}",
                    self.file_name
                )));
            }
        };
        envelope::decode(&contents).map(Some)
    }

    async fn replace_all(&self, entities: &[ConfigurableEntity]) -> Result<(), EntityStoreError> {
        let contents = envelope::encode(entities)?;
        atomic::write_atomic(&self.dir, &self.file_name, &contents)?;
        debug!(file = %self.file_name, count = entities.len(), "entity store replaced");
        Ok(())
    }
}
