//! Outbound adapters implementing domain ports.
//!
//! - **json_store**: the persisted collection as a versioned JSON file,
//!   replaced atomically on write
//! - **memory**: an in-process store for tests and ephemeral sessions
//!
//! Adapters are thin translators between domain types and storage. They
//! contain no lifecycle rules.

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileEntityStore;
pub use memory::InMemoryEntityStore;
