//! Port for the external permission lookup.
//!
//! The authorisation collaborator that answers `hasPermission` lives outside
//! this crate (session storage, API-backed grants, ...). The access evaluator
//! only talks to it through [`PermissionLookup`].

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::PermissionKey;

/// Errors raised by permission lookup adapters.
///
/// The access evaluator returns these unchanged; deciding whether a failed
/// lookup means "deny" is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionLookupError {
    /// The authorisation source could not be reached.
    #[error("permission source unavailable: {message}")]
    Unavailable { message: String },
    /// The authorisation source refused to answer for this key.
    #[error("permission lookup for '{key}' failed: {message}")]
    Rejected { key: String, message: String },
}

impl PermissionLookupError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(key: &PermissionKey, message: impl Into<String>) -> Self {
        Self::Rejected {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Answers whether the current session holds a permission.
///
/// Implementations are queried once per item per render, so they should be
/// cheap and free of side effects, or memoised by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionLookup {
    fn has_permission(&self, key: &PermissionKey) -> Result<bool, PermissionLookupError>;
}

impl<F> PermissionLookup for F
where
    F: Fn(&PermissionKey) -> Result<bool, PermissionLookupError>,
{
    fn has_permission(&self, key: &PermissionKey) -> Result<bool, PermissionLookupError> {
        self(key)
    }
}

/// In-process lookup backed by a fixed set of granted keys.
///
/// # Examples
///
/// ```
/// # use clinic_backend::domain::PermissionKey;
/// # use clinic_backend::domain::ports::{GrantedPermissions, PermissionLookup};
/// let view = PermissionKey::new("appointments.view").expect("valid key");
/// let grants = GrantedPermissions::new([view.clone()]);
///
/// assert_eq!(grants.has_permission(&view), Ok(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    granted: HashSet<PermissionKey>,
}

impl GrantedPermissions {
    pub fn new(granted: impl IntoIterator<Item = PermissionKey>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    pub fn grant(&mut self, key: PermissionKey) {
        self.granted.insert(key);
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl PermissionLookup for GrantedPermissions {
    fn has_permission(&self, key: &PermissionKey) -> Result<bool, PermissionLookupError> {
        Ok(self.granted.contains(key))
    }
}
