//! Domain ports for the hexagonal boundary.
//!
//! The domain talks to two external collaborators: the authorisation source
//! answering permission lookups, and the store persisting configurable
//! entity collections.

mod entity_store;
mod permission_lookup;

#[cfg(test)]
pub use entity_store::MockEntityStore;
pub use entity_store::{EntityStore, EntityStoreError};
#[cfg(test)]
pub use permission_lookup::MockPermissionLookup;
pub use permission_lookup::{GrantedPermissions, PermissionLookup, PermissionLookupError};
