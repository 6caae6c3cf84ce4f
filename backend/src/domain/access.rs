//! Access evaluator: decides which navigation items a user may see.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. Bypass roles (`super_admin`, `admin`) see everything.
//! 2. The landing route is open to any authenticated user.
//! 3. A single required permission must be granted.
//! 4. A permission set is combined with OR (`AnyOf`) or AND (`AllOf`).
//! 5. Items declaring nothing are implicitly allowed.
//!
//! Evaluation has no side effects. Failures from the permission lookup are
//! returned unchanged; the evaluator never turns them into a deny.

use super::navigation::{LANDING_ROUTE, NavigationItem, NavigationSection};
use super::permission::{PermissionKey, PermissionRequirement};
use super::ports::{PermissionLookup, PermissionLookupError};
use super::user::CurrentUser;

/// Evaluates navigation access for one user against one permission source.
///
/// # Examples
///
/// ```
/// use clinic_backend::domain::ports::GrantedPermissions;
/// use clinic_backend::domain::{
///     AccessEvaluator, CurrentUser, NavigationItem, PermissionKey, PermissionRequirement, Role,
///     UserId,
/// };
///
/// let view = PermissionKey::new("appointments.view").expect("valid key");
/// let grants = GrantedPermissions::new([view.clone()]);
/// let user = CurrentUser::new(UserId::random(), Role::Receptionist);
/// let item = NavigationItem::new("/appointments", "Appointments", PermissionRequirement::Single(view));
///
/// let evaluator = AccessEvaluator::new(&user, &grants);
/// assert_eq!(evaluator.can_access(&item), Ok(true));
/// ```
pub struct AccessEvaluator<'a, P: ?Sized> {
    user: &'a CurrentUser,
    permissions: &'a P,
}

impl<'a, P> AccessEvaluator<'a, P>
where
    P: PermissionLookup + ?Sized,
{
    pub fn new(user: &'a CurrentUser, permissions: &'a P) -> Self {
        Self { user, permissions }
    }

    pub fn user(&self) -> &CurrentUser {
        self.user
    }

    /// Whether the user may open `item`.
    pub fn can_access(&self, item: &NavigationItem) -> Result<bool, PermissionLookupError> {
        if self.user.role().is_bypass() {
            return Ok(true);
        }
        if item.key() == LANDING_ROUTE {
            return Ok(true);
        }
        match item.requirement() {
            PermissionRequirement::Single(key) => self.permissions.has_permission(key),
            PermissionRequirement::AnyOf(keys) => self.any_granted(keys),
            PermissionRequirement::AllOf(keys) => self.all_granted(keys),
            PermissionRequirement::None => Ok(true),
        }
    }

    fn any_granted(&self, keys: &[PermissionKey]) -> Result<bool, PermissionLookupError> {
        for key in keys {
            if self.permissions.has_permission(key)? {
                return Ok(true);
            }
        }
        Ok(keys.is_empty())
    }

    fn all_granted(&self, keys: &[PermissionKey]) -> Result<bool, PermissionLookupError> {
        for key in keys {
            if !self.permissions.has_permission(key)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The section restricted to accessible items, or `None` when no item
    /// survives. Item order is preserved.
    pub fn filter_section(
        &self,
        section: &NavigationSection,
    ) -> Result<Option<NavigationSection>, PermissionLookupError> {
        let mut accessible = Vec::with_capacity(section.items().len());
        for item in section.items() {
            if self.can_access(item)? {
                accessible.push(item.clone());
            }
        }

        if accessible.is_empty() {
            Ok(None)
        } else {
            Ok(Some(section.with_items(accessible)))
        }
    }

    /// Filter a whole navigation tree, dropping sections left empty.
    pub fn filter_navigation(
        &self,
        sections: &[NavigationSection],
    ) -> Result<Vec<NavigationSection>, PermissionLookupError> {
        let mut visible = Vec::with_capacity(sections.len());
        for section in sections {
            if let Some(filtered) = self.filter_section(section)? {
                visible.push(filtered);
            }
        }
        Ok(visible)
    }

    /// Whether any accessible item in `section` satisfies `is_active`.
    pub fn has_active_item<F>(
        &self,
        section: &NavigationSection,
        is_active: F,
    ) -> Result<bool, PermissionLookupError>
    where
        F: Fn(&NavigationItem) -> bool,
    {
        for item in section.items().iter().filter(|item| is_active(item)) {
            if self.can_access(item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
