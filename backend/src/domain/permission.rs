//! Permission keys and the requirements navigation items declare on them.
//!
//! Permission keys are namespaced (`resource.action`) and validated where
//! they are declared, so a misspelt key is rejected when the navigation tree
//! is built instead of silently denying access at runtime.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by [`PermissionKey::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionKeyValidationError {
    Empty,
    MissingNamespace { key: String },
    InvalidCharacters { key: String },
}

impl fmt::Display for PermissionKeyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "permission key must not be empty"),
            Self::MissingNamespace { key } => {
                write!(f, "permission key '{key}' must have the form resource.action")
            }
            Self::InvalidCharacters { key } => write!(
                f,
                "permission key '{key}' may only contain lowercase letters, digits, and underscores between dots",
            ),
        }
    }
}

impl std::error::Error for PermissionKeyValidationError {}

static PERMISSION_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn permission_key_regex() -> &'static Regex {
    PERMISSION_KEY_RE.get_or_init(|| {
        let pattern = r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("permission key regex failed to compile: {error}"))
    })
}

/// Namespaced permission identifier such as `appointments.view`.
///
/// # Examples
///
/// ```
/// # use clinic_backend::domain::PermissionKey;
/// let key = PermissionKey::new("appointments.view").expect("valid key");
///
/// assert_eq!(key.namespace(), "appointments");
/// assert!(PermissionKey::new("appointments").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

impl PermissionKey {
    /// Validate and construct a [`PermissionKey`].
    pub fn new(key: impl Into<String>) -> Result<Self, PermissionKeyValidationError> {
        Self::from_owned(key.into())
    }

    fn from_owned(key: String) -> Result<Self, PermissionKeyValidationError> {
        if key.trim().is_empty() {
            return Err(PermissionKeyValidationError::Empty);
        }
        if !key.contains('.') {
            return Err(PermissionKeyValidationError::MissingNamespace { key });
        }
        if !permission_key_regex().is_match(&key) {
            return Err(PermissionKeyValidationError::InvalidCharacters { key });
        }
        Ok(Self(key))
    }

    /// The resource segment before the first dot.
    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PermissionKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = PermissionKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

impl TryFrom<&str> for PermissionKey {
    type Error = PermissionKeyValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_owned(value.to_owned())
    }
}

/// Normalised permission requirement declared by a navigation item.
///
/// A single `required_permission` always wins over a permission set; an empty
/// set is the same as declaring nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "permissions", rename_all = "snake_case")]
pub enum PermissionRequirement {
    /// No permission declared; any authenticated user may access the item.
    #[default]
    None,
    /// Exactly one permission must be granted.
    Single(PermissionKey),
    /// Every listed permission must be granted.
    AllOf(Vec<PermissionKey>),
    /// At least one listed permission must be granted.
    AnyOf(Vec<PermissionKey>),
}

impl PermissionRequirement {
    /// Build a requirement from the raw declaration fields.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clinic_backend::domain::{PermissionKey, PermissionRequirement};
    /// let invoices = PermissionKey::new("invoices.view").expect("valid key");
    /// let payments = PermissionKey::new("payments.view").expect("valid key");
    ///
    /// let requirement =
    ///     PermissionRequirement::from_declaration(None, vec![invoices, payments], true);
    /// assert!(matches!(requirement, PermissionRequirement::AnyOf(keys) if keys.len() == 2));
    /// assert_eq!(
    ///     PermissionRequirement::from_declaration(None, Vec::new(), false),
    ///     PermissionRequirement::None,
    /// );
    /// ```
    pub fn from_declaration(
        required_permission: Option<PermissionKey>,
        required_permissions: Vec<PermissionKey>,
        requires_any: bool,
    ) -> Self {
        if let Some(key) = required_permission {
            return Self::Single(key);
        }
        if required_permissions.is_empty() {
            return Self::None;
        }
        if requires_any {
            Self::AnyOf(required_permissions)
        } else {
            Self::AllOf(required_permissions)
        }
    }

    /// Every permission key mentioned by the requirement.
    pub fn keys(&self) -> &[PermissionKey] {
        match self {
            Self::None => &[],
            Self::Single(key) => std::slice::from_ref(key),
            Self::AllOf(keys) | Self::AnyOf(keys) => keys.as_slice(),
        }
    }
}

/// The set of permission keys a deployment knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCatalog {
    keys: BTreeSet<PermissionKey>,
}

impl PermissionCatalog {
    pub fn new(keys: impl IntoIterator<Item = PermissionKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Parse a catalog from raw key strings, failing on the first invalid key.
    pub fn from_strs<'a>(
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, PermissionKeyValidationError> {
        let keys = keys
            .into_iter()
            .map(PermissionKey::try_from)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { keys })
    }

    pub fn contains(&self, key: &PermissionKey) -> bool {
        self.keys.contains(key)
    }

    /// Look up a key by its string form, returning the catalogued value.
    pub fn get(&self, key: &str) -> Option<&PermissionKey> {
        self.keys.iter().find(|candidate| candidate.as_str() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

const CLINIC_PERMISSION_KEYS: &[&str] = &[
    "dashboard.view",
    "patients.view",
    "patients.create",
    "appointments.view",
    "appointments.manage",
    "invoices.view",
    "payments.view",
    "inventory.view",
    "inventory.manage",
    "staff.view",
    "staff.manage",
    "lab_vendors.view",
    "reports.view",
    "settings.view",
    "settings.statuses",
];

/// Permission keys declared by the clinic dashboard.
pub fn clinic_permission_catalog() -> PermissionCatalog {
    PermissionCatalog::new(
        CLINIC_PERMISSION_KEYS
            .iter()
            .filter_map(|key| PermissionKey::try_from(*key).ok()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(raw: &str) -> PermissionKey {
        PermissionKey::new(raw).expect("valid permission key")
    }

    #[rstest]
    #[case::simple("appointments.view")]
    #[case::underscored("lab_vendors.view")]
    #[case::nested("settings.statuses.edit")]
    #[case::digits("reports2.view")]
    fn accepts_namespaced_keys(#[case] raw: &str) {
        assert_eq!(key(raw).as_str(), raw);
    }

    #[rstest]
    #[case::empty("", PermissionKeyValidationError::Empty)]
    #[case::blank("   ", PermissionKeyValidationError::Empty)]
    #[case::bare("appointments", PermissionKeyValidationError::MissingNamespace { key: "appointments".to_owned() })]
    #[case::upper("Appointments.View", PermissionKeyValidationError::InvalidCharacters { key: "Appointments.View".to_owned() })]
    #[case::trailing_dot("appointments.", PermissionKeyValidationError::InvalidCharacters { key: "appointments.".to_owned() })]
    #[case::hyphen("lab-vendors.view", PermissionKeyValidationError::InvalidCharacters { key: "lab-vendors.view".to_owned() })]
    fn rejects_malformed_keys(#[case] raw: &str, #[case] expected: PermissionKeyValidationError) {
        assert_eq!(PermissionKey::new(raw), Err(expected));
    }

    #[rstest]
    fn namespace_is_first_segment() {
        assert_eq!(key("settings.statuses.edit").namespace(), "settings");
    }

    #[rstest]
    fn single_permission_wins_over_set() {
        let requirement = PermissionRequirement::from_declaration(
            Some(key("appointments.view")),
            vec![key("invoices.view")],
            true,
        );
        assert_eq!(
            requirement,
            PermissionRequirement::Single(key("appointments.view"))
        );
    }

    #[rstest]
    #[case::any(true)]
    #[case::all(false)]
    fn set_declaration_selects_combinator(#[case] requires_any: bool) {
        let keys = vec![key("invoices.view"), key("payments.view")];
        let requirement =
            PermissionRequirement::from_declaration(None, keys.clone(), requires_any);
        let expected = if requires_any {
            PermissionRequirement::AnyOf(keys)
        } else {
            PermissionRequirement::AllOf(keys)
        };
        assert_eq!(requirement, expected);
    }

    #[rstest]
    fn keys_lists_every_declared_permission() {
        let requirement =
            PermissionRequirement::AllOf(vec![key("staff.view"), key("staff.manage")]);
        assert_eq!(requirement.keys().len(), 2);
        assert!(PermissionRequirement::None.keys().is_empty());
    }

    #[rstest]
    fn clinic_catalog_contains_every_declared_key() {
        let catalog = clinic_permission_catalog();
        assert_eq!(catalog.len(), CLINIC_PERMISSION_KEYS.len());
        assert!(catalog.contains(&key("appointments.view")));
        assert!(catalog.get("settings.statuses").is_some());
        assert!(catalog.get("settings.unknown").is_none());
    }

    #[rstest]
    fn from_strs_fails_on_first_invalid_key() {
        let result = PermissionCatalog::from_strs(["patients.view", "Patients"]);
        assert!(result.is_err());
    }
}
