//! Structured refusals raised by lifecycle operations.

use thiserror::Error;

use crate::domain::entity::EntityValidationError;
use crate::domain::ports::EntityStoreError;

/// Why a lifecycle operation was refused.
///
/// Every refusal leaves the collection exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// No record matches the reference.
    #[error("no entity matches {reference}")]
    NotFound { reference: String },
    /// More than one record matches the reference.
    #[error("{matches} entities match {reference}")]
    AmbiguousMatch { reference: String, matches: usize },
    /// The record's code is on the profile's protected list.
    #[error("entity {code} is protected and cannot be deleted")]
    ProtectedEntity { code: String },
    /// The record is the collection default.
    #[error("entity {code} is the default and cannot be deleted")]
    DefaultEntity { code: String },
    /// Restore was requested for a record that is not deleted.
    #[error("entity {code} is not deleted")]
    NotDeleted { code: String },
    /// A reorder sequence is not a permutation of the collection.
    #[error("reorder rejected: {reason}")]
    ReorderMismatch { reason: String },
    /// Submitted fields failed validation.
    #[error("invalid entity: {0}")]
    Validation(#[from] EntityValidationError),
    /// The store failed to load or persist the collection.
    #[error(transparent)]
    Store(#[from] EntityStoreError),
}

impl LifecycleError {
    /// Short machine-readable reason used in refusal logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::ProtectedEntity { .. } => "protected",
            Self::DefaultEntity { .. } => "default",
            Self::NotDeleted { .. } => "not_deleted",
            Self::ReorderMismatch { .. } => "reorder_mismatch",
            Self::Validation(_) => "validation",
            Self::Store(_) => "store",
        }
    }
}
