//! Configurable domain entities such as appointment statuses.
//!
//! An entity is never hard-deleted. Its lifecycle is the pair
//! `isDeleted`/`isActive`, which this module models as a single
//! [`LifecycleState`] so the two flags cannot drift apart; the pair is only
//! materialised at the serialisation boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of an entity code.
pub const ENTITY_CODE_MAX: usize = 32;

/// Validation errors returned by entity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    EmptyCode,
    CodeTooLong { max: usize },
    CodeContainsWhitespace,
    EmptyName,
    EmptyColor,
    InvalidId,
}

impl fmt::Display for EntityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "entity code must not be empty"),
            Self::CodeTooLong { max } => write!(f, "entity code must be at most {max} characters"),
            Self::CodeContainsWhitespace => write!(f, "entity code must not contain whitespace"),
            Self::EmptyName => write!(f, "entity name must not be empty"),
            Self::EmptyColor => write!(f, "entity color must not be empty"),
            Self::InvalidId => write!(f, "entity id must be a valid UUID"),
        }
    }
}

impl std::error::Error for EntityValidationError {}

/// Stable identifier assigned when an entity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for EntityId {
    type Err = EntityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| EntityValidationError::InvalidId)
    }
}

/// Human-facing code such as `S001`; immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityCode(String);

impl EntityCode {
    /// Validate and construct an [`EntityCode`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use clinic_backend::domain::EntityCode;
    /// assert_eq!(EntityCode::new("S001").expect("valid code").as_str(), "S001");
    /// assert!(EntityCode::new("S 001").is_err());
    /// ```
    pub fn new(code: impl Into<String>) -> Result<Self, EntityValidationError> {
        Self::from_owned(code.into())
    }

    fn from_owned(code: String) -> Result<Self, EntityValidationError> {
        if code.is_empty() {
            return Err(EntityValidationError::EmptyCode);
        }
        if code.chars().any(char::is_whitespace) {
            return Err(EntityValidationError::CodeContainsWhitespace);
        }
        if code.chars().count() > ENTITY_CODE_MAX {
            return Err(EntityValidationError::CodeTooLong {
                max: ENTITY_CODE_MAX,
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EntityCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EntityCode> for String {
    fn from(value: EntityCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for EntityCode {
    type Error = EntityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Soft-delete state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// `isDeleted = false`, `isActive = true`.
    #[default]
    Active,
    /// `isDeleted = true`, `isActive = false`.
    Deleted,
}

impl LifecycleState {
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A configurable record owned by a single persisted collection.
///
/// ## Invariants
/// - `code` never changes after creation.
/// - `is_deleted()` and `is_active()` are always opposite.
/// - `name` and `color` are non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntityRecord", into = "EntityRecord")]
pub struct ConfigurableEntity {
    id: EntityId,
    code: EntityCode,
    name: String,
    color: String,
    description: Option<String>,
    order: u32,
    is_default: bool,
    state: LifecycleState,
}

impl ConfigurableEntity {
    /// Build an active entity from validated parts.
    pub fn new(
        id: EntityId,
        code: EntityCode,
        name: impl Into<String>,
        color: impl Into<String>,
        order: u32,
    ) -> Result<Self, EntityValidationError> {
        Ok(Self {
            id,
            code,
            name: non_empty(name.into(), EntityValidationError::EmptyName)?,
            color: non_empty(color.into(), EntityValidationError::EmptyColor)?,
            description: None,
            order,
            is_default: false,
            state: LifecycleState::Active,
        })
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Flag the entity as the collection default.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Start the entity in the given lifecycle state.
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn code(&self) -> &EntityCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn color(&self) -> &str {
        self.color.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub(crate) fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    /// Apply the mutable display fields of a patch. The code is untouched.
    pub(crate) fn apply(&mut self, patch: &EntityPatch) -> Result<(), EntityValidationError> {
        let name = patch
            .name
            .clone()
            .map(|name| non_empty(name, EntityValidationError::EmptyName))
            .transpose()?;
        let color = patch
            .color
            .clone()
            .map(|color| non_empty(color, EntityValidationError::EmptyColor))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone()).filter(|text| !text.trim().is_empty());
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
        Ok(())
    }
}

fn non_empty(value: String, error: EntityValidationError) -> Result<String, EntityValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}

/// Input for creating a new entity.
///
/// `code` and `order` are optional: a fresh code is generated when absent
/// and the order defaults to one past the current maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDraft {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update of an entity's display fields.
///
/// `code` is accepted so that whole-record edits from the settings UI can be
/// passed through unchanged, but it is always discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPatch {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// Flat persisted form of [`ConfigurableEntity`].
///
/// `isDeleted` is authoritative on read; `isActive` is always written as its
/// negation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRecord {
    id: EntityId,
    code: String,
    name: String,
    color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    order: u32,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

impl From<ConfigurableEntity> for EntityRecord {
    fn from(value: ConfigurableEntity) -> Self {
        Self {
            id: value.id,
            code: value.code.into(),
            name: value.name,
            color: value.color,
            description: value.description,
            order: value.order,
            is_default: value.is_default,
            is_deleted: value.state.is_deleted(),
            is_active: value.state.is_active(),
        }
    }
}

impl TryFrom<EntityRecord> for ConfigurableEntity {
    type Error = EntityValidationError;

    fn try_from(value: EntityRecord) -> Result<Self, Self::Error> {
        let state = if value.is_deleted {
            LifecycleState::Deleted
        } else {
            LifecycleState::Active
        };
        let mut entity = Self::new(
            value.id,
            EntityCode::new(value.code)?,
            value.name,
            value.color,
            value.order,
        )?
        .with_default(value.is_default)
        .with_state(state);
        entity.description = value.description;
        Ok(entity)
    }
}
