//! Entity Lifecycle Manager.
//!
//! Keeps a collection of configurable entities consistent across create,
//! update, soft delete, restore and reorder. Records are never removed:
//! deletion flips the lifecycle state and can always be undone.
//!
//! The transitions in [`EntityCollection`] are pure. [`EntityLifecycleService`]
//! wraps them with loading, seeding and persistence through the
//! [`EntityStore`](crate::domain::ports::EntityStore) port.

mod collection;
mod error;
mod identity;
mod profile;
mod service;

pub use collection::{EntityCollection, LifecycleOutcome, Partition, partition};
pub use error::LifecycleError;
pub use identity::EntityRef;
pub use profile::{CatalogueProfile, SeedEntity};
pub use service::EntityLifecycleService;
