//! Authenticated user as seen by the access evaluator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::{ParseRoleError, Role};

/// Validation errors returned by [`CurrentUser::try_from_strings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    UnknownRole(ParseRoleError),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::UnknownRole(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<ParseRoleError> for UserValidationError {
    fn from(value: ParseRoleError) -> Self {
        Self::UnknownRole(value)
    }
}

/// Session user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The user on whose behalf navigation is filtered.
///
/// ## Invariants
/// - `role` is fixed for the lifetime of the value; there is no setter, so a
///   role change requires a new session and a new `CurrentUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CurrentUser {
    id: UserId,
    role: Role,
}

impl CurrentUser {
    /// Build a new [`CurrentUser`] from validated components.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Fallible constructor for raw session values.
    ///
    /// Prefer [`CurrentUser::new`] when components are already validated.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        role: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        let id = id.as_ref().parse::<UserId>()?;
        let role = role.as_ref().parse::<Role>()?;
        Ok(Self::new(id, role))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Role assigned for this session.
    pub fn role(&self) -> Role {
        self.role
    }
}
