//! Port for persisting a collection of configurable entities.
//!
//! The [`EntityStore`] trait treats the collection as a single document: it
//! is read whole and replaced whole. Every lifecycle mutation is a
//! read-modify-replace cycle, so adapters never see partial updates.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ConfigurableEntity;

/// Errors raised by entity store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityStoreError {
    /// The backing store could not be reached.
    #[error("entity store connection failed: {message}")]
    Connection { message: String },
    /// The stored collection could not be read.
    #[error("entity store read failed: {message}")]
    Read { message: String },
    /// The collection could not be written.
    #[error("entity store write failed: {message}")]
    Write { message: String },
    /// The stored collection is not a valid document.
    #[error("entity store payload is malformed: {message}")]
    Malformed { message: String },
    /// The stored document uses a schema version this build cannot read.
    #[error("unsupported entity store version: expected at most {supported}, found {actual}")]
    UnsupportedVersion { supported: u32, actual: u32 },
}

impl EntityStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Port for loading and replacing the persisted entity collection.
///
/// # Semantics
///
/// - [`EntityStore::load`] returns `None` when nothing has been persisted yet
///   under the store's identifier; callers decide whether to seed defaults.
/// - [`EntityStore::replace_all`] atomically replaces the whole collection.
///   Readers observe either the previous or the new collection, never a mix.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch the persisted collection in stored order.
    async fn load(&self) -> Result<Option<Vec<ConfigurableEntity>>, EntityStoreError>;

    /// Replace the persisted collection with `entities`.
    async fn replace_all(&self, entities: &[ConfigurableEntity]) -> Result<(), EntityStoreError>;
}
