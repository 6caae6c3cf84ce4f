//! Navigation tree declarations.
//!
//! Items and sections are declared once, when the dashboard shell is
//! configured, and are never created or destroyed at runtime. Declarations
//! arrive as loosely typed records (`NavigationSectionDeclaration`) and are
//! validated against a [`PermissionCatalog`] before they become
//! [`NavigationSection`] values the access evaluator can work with.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permission::{
    PermissionCatalog, PermissionKey, PermissionKeyValidationError, PermissionRequirement,
};

/// Route every authenticated user may open regardless of declared permissions.
pub const LANDING_ROUTE: &str = "/";

/// Errors raised while validating navigation declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationValidationError {
    #[error("navigation declarations are not valid JSON: {message}")]
    Parse { message: String },
    #[error("navigation {what} key must not be empty")]
    EmptyKey { what: &'static str },
    #[error("navigation section '{key}' is declared more than once")]
    DuplicateSection { key: String },
    #[error("navigation item '{key}' is declared more than once in section '{section}'")]
    DuplicateItem { section: String, key: String },
    #[error("navigation item '{item}' declares a malformed permission: {source}")]
    InvalidPermission {
        item: String,
        #[source]
        source: PermissionKeyValidationError,
    },
    #[error("navigation item '{item}' requires unknown permission '{key}'")]
    UnknownPermission { item: String, key: String },
}

/// Raw navigation item as declared by the dashboard shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct NavigationItemDeclaration {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required_permission: Option<String>,
    #[serde(default)]
    pub required_permissions: Vec<String>,
    #[serde(default)]
    pub requires_any: bool,
}

/// Raw navigation section as declared by the dashboard shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct NavigationSectionDeclaration {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default)]
    pub default_collapsed: bool,
    pub items: Vec<NavigationItemDeclaration>,
}

/// A navigable entry point guarded by a permission requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    key: String,
    label: String,
    requirement: PermissionRequirement,
}

impl NavigationItem {
    /// Build an item from already validated parts.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        requirement: PermissionRequirement,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            requirement,
        }
    }

    /// Validate a raw declaration against the permission catalog.
    pub fn from_declaration(
        declaration: NavigationItemDeclaration,
        catalog: &PermissionCatalog,
    ) -> Result<Self, NavigationValidationError> {
        let NavigationItemDeclaration {
            key,
            label,
            required_permission,
            required_permissions,
            requires_any,
        } = declaration;
        if key.trim().is_empty() {
            return Err(NavigationValidationError::EmptyKey { what: "item" });
        }

        let required_permission = required_permission
            .map(|raw| catalogued_key(&key, raw, catalog))
            .transpose()?;
        let required_permissions = required_permissions
            .into_iter()
            .map(|raw| catalogued_key(&key, raw, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let requirement = PermissionRequirement::from_declaration(
            required_permission,
            required_permissions,
            requires_any,
        );

        Ok(Self::new(key, label, requirement))
    }

    /// Route or href the item links to.
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn requirement(&self) -> &PermissionRequirement {
        &self.requirement
    }

    /// Whether `route` is this item's route or nested below it.
    ///
    /// The landing route only matches itself so that it does not claim every
    /// page of the dashboard.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clinic_backend::domain::{NavigationItem, PermissionRequirement};
    /// let item = NavigationItem::new("/patients", "Patients", PermissionRequirement::None);
    ///
    /// assert!(item.matches_route("/patients"));
    /// assert!(item.matches_route("/patients/42"));
    /// assert!(!item.matches_route("/patients-archive"));
    /// ```
    pub fn matches_route(&self, route: &str) -> bool {
        if self.key == LANDING_ROUTE {
            return route == LANDING_ROUTE;
        }
        match route.strip_prefix(self.key.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

fn catalogued_key(
    item: &str,
    raw: String,
    catalog: &PermissionCatalog,
) -> Result<PermissionKey, NavigationValidationError> {
    let key = PermissionKey::new(raw).map_err(|source| {
        NavigationValidationError::InvalidPermission {
            item: item.to_owned(),
            source,
        }
    })?;
    if !catalog.contains(&key) {
        return Err(NavigationValidationError::UnknownPermission {
            item: item.to_owned(),
            key: key.into(),
        });
    }
    Ok(key)
}

/// Ordered group of navigation items sharing a collapsible header.
///
/// `key` doubles as the identifier under which the user's collapse
/// preference is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSection {
    key: String,
    label: String,
    collapsible: bool,
    default_collapsed: bool,
    items: Vec<NavigationItem>,
}

impl NavigationSection {
    pub fn new(key: impl Into<String>, label: impl Into<String>, items: Vec<NavigationItem>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            collapsible: false,
            default_collapsed: false,
            items,
        }
    }

    /// Mark the section as collapsible, optionally starting collapsed.
    pub fn collapsible(mut self, default_collapsed: bool) -> Self {
        self.collapsible = true;
        self.default_collapsed = default_collapsed;
        self
    }

    /// Validate a raw section declaration against the permission catalog.
    pub fn from_declaration(
        declaration: NavigationSectionDeclaration,
        catalog: &PermissionCatalog,
    ) -> Result<Self, NavigationValidationError> {
        let NavigationSectionDeclaration {
            key,
            label,
            collapsible,
            default_collapsed,
            items,
        } = declaration;
        if key.trim().is_empty() {
            return Err(NavigationValidationError::EmptyKey { what: "section" });
        }
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .map(|item| {
                if !seen.insert(item.key.clone()) {
                    return Err(NavigationValidationError::DuplicateItem {
                        section: key.clone(),
                        key: item.key,
                    });
                }
                NavigationItem::from_declaration(item, catalog)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key,
            label,
            collapsible,
            default_collapsed: collapsible && default_collapsed,
            items,
        })
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn is_collapsible(&self) -> bool {
        self.collapsible
    }

    pub fn is_default_collapsed(&self) -> bool {
        self.default_collapsed
    }

    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// Copy of this section carrying `items` instead of the declared ones.
    pub(crate) fn with_items(&self, items: Vec<NavigationItem>) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            collapsible: self.collapsible,
            default_collapsed: self.default_collapsed,
            items,
        }
    }
}

/// Validate a full set of section declarations.
///
/// Section keys must be unique because they identify persisted collapse
/// preferences. Item keys must be unique within their section.
pub fn build_navigation(
    declarations: Vec<NavigationSectionDeclaration>,
    catalog: &PermissionCatalog,
) -> Result<Vec<NavigationSection>, NavigationValidationError> {
    let mut seen = HashSet::new();
    declarations
        .into_iter()
        .map(|declaration| {
            if !seen.insert(declaration.key.clone()) {
                return Err(NavigationValidationError::DuplicateSection {
                    key: declaration.key,
                });
            }
            NavigationSection::from_declaration(declaration, catalog)
        })
        .collect()
}

/// Parse and validate section declarations from JSON.
pub fn navigation_from_json(
    json: &str,
    catalog: &PermissionCatalog,
) -> Result<Vec<NavigationSection>, NavigationValidationError> {
    let declarations: Vec<NavigationSectionDeclaration> =
        serde_json::from_str(json).map_err(|error| NavigationValidationError::Parse {
            message: error.to_string(),
        })?;
    build_navigation(declarations, catalog)
}

const CLINIC_NAVIGATION_JSON: &str = r#"[
    {
        "key": "main",
        "label": "Main",
        "items": [
            { "key": "/", "label": "Dashboard", "requiredPermission": "dashboard.view" },
            { "key": "/patients", "label": "Patients", "requiredPermission": "patients.view" },
            { "key": "/appointments", "label": "Appointments", "requiredPermission": "appointments.view" }
        ]
    },
    {
        "key": "billing",
        "label": "Billing",
        "collapsible": true,
        "items": [
            {
                "key": "/billing",
                "label": "Billing overview",
                "requiredPermissions": ["invoices.view", "payments.view"],
                "requiresAny": true
            },
            { "key": "/billing/invoices", "label": "Invoices", "requiredPermission": "invoices.view" },
            { "key": "/billing/payments", "label": "Payments", "requiredPermission": "payments.view" }
        ]
    },
    {
        "key": "operations",
        "label": "Operations",
        "collapsible": true,
        "items": [
            { "key": "/inventory", "label": "Inventory", "requiredPermission": "inventory.view" },
            { "key": "/lab-vendors", "label": "Lab vendors", "requiredPermission": "lab_vendors.view" },
            { "key": "/reports", "label": "Reports", "requiredPermission": "reports.view" }
        ]
    },
    {
        "key": "administration",
        "label": "Administration",
        "collapsible": true,
        "defaultCollapsed": true,
        "items": [
            {
                "key": "/staff",
                "label": "Staff",
                "requiredPermissions": ["staff.view", "staff.manage"]
            },
            {
                "key": "/settings/appointment-statuses",
                "label": "Appointment statuses",
                "requiredPermissions": ["settings.view", "settings.statuses"]
            },
            { "key": "/settings", "label": "Settings", "requiredPermission": "settings.view" }
        ]
    },
    {
        "key": "help",
        "label": "Help",
        "items": [
            { "key": "/help", "label": "Help centre" }
        ]
    }
]"#;

/// The clinic dashboard's declared navigation tree.
pub fn clinic_navigation(
    catalog: &PermissionCatalog,
) -> Result<Vec<NavigationSection>, NavigationValidationError> {
    navigation_from_json(CLINIC_NAVIGATION_JSON, catalog)
}
