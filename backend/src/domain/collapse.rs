//! Per-user collapse preferences for navigation sections.
//!
//! Collapse state is layered on top of access filtering and never feeds back
//! into it: a collapsed section still has the same accessible items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::access::AccessEvaluator;
use super::navigation::{NavigationItem, NavigationSection};
use super::ports::{PermissionLookup, PermissionLookupError};

/// Remembered collapse flags keyed by section key.
///
/// Sections without a remembered flag fall back to their declared
/// `default_collapsed`. Non-collapsible sections are always expanded.
///
/// # Examples
///
/// ```
/// # use clinic_backend::domain::{CollapseState, NavigationSection};
/// let section = NavigationSection::new("billing", "Billing", Vec::new()).collapsible(true);
/// let mut state = CollapseState::default();
///
/// assert!(state.is_collapsed(&section));
/// assert!(!state.toggle(&section));
/// assert!(!state.is_collapsed(&section));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseState {
    collapsed: BTreeMap<String, bool>,
}

impl CollapseState {
    pub fn is_collapsed(&self, section: &NavigationSection) -> bool {
        if !section.is_collapsible() {
            return false;
        }
        self.collapsed
            .get(section.key())
            .copied()
            .unwrap_or(section.is_default_collapsed())
    }

    /// Flip a collapsible section and return its new collapsed flag.
    pub fn toggle(&mut self, section: &NavigationSection) -> bool {
        if !section.is_collapsible() {
            return false;
        }
        let collapsed = !self.is_collapsed(section);
        self.collapsed.insert(section.key().to_owned(), collapsed);
        collapsed
    }

    /// Remember an explicit choice for a collapsible section.
    pub fn set_collapsed(&mut self, section: &NavigationSection, collapsed: bool) {
        if section.is_collapsible() {
            self.collapsed.insert(section.key().to_owned(), collapsed);
        }
    }

    /// Expand `section` when it holds an accessible item matching
    /// `is_active`. Returns whether the state changed.
    ///
    /// This only ever expands; an expanded section is left untouched even if
    /// nothing in it is active.
    pub fn auto_expand_if_active<P, F>(
        &mut self,
        evaluator: &AccessEvaluator<'_, P>,
        section: &NavigationSection,
        is_active: F,
    ) -> Result<bool, PermissionLookupError>
    where
        P: PermissionLookup + ?Sized,
        F: Fn(&NavigationItem) -> bool,
    {
        if !self.is_collapsed(section) {
            return Ok(false);
        }
        if !evaluator.has_active_item(section, is_active)? {
            return Ok(false);
        }
        self.collapsed.insert(section.key().to_owned(), false);
        Ok(true)
    }

    /// [`CollapseState::auto_expand_if_active`] using route prefix matching.
    pub fn auto_expand_for_route<P>(
        &mut self,
        evaluator: &AccessEvaluator<'_, P>,
        section: &NavigationSection,
        current_route: &str,
    ) -> Result<bool, PermissionLookupError>
    where
        P: PermissionLookup + ?Sized,
    {
        self.auto_expand_if_active(evaluator, section, |item| {
            item.matches_route(current_route)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::GrantedPermissions;
    use crate::domain::{CurrentUser, PermissionKey, PermissionRequirement, Role, UserId};
    use rstest::{fixture, rstest};

    fn key(raw: &str) -> PermissionKey {
        PermissionKey::new(raw).expect("valid permission key")
    }

    #[fixture]
    fn administration() -> NavigationSection {
        NavigationSection::new(
            "administration",
            "Administration",
            vec![
                NavigationItem::new(
                    "/staff",
                    "Staff",
                    PermissionRequirement::Single(key("staff.view")),
                ),
                NavigationItem::new(
                    "/settings",
                    "Settings",
                    PermissionRequirement::Single(key("settings.view")),
                ),
            ],
        )
        .collapsible(true)
    }

    #[fixture]
    fn nurse() -> CurrentUser {
        CurrentUser::new(UserId::random(), Role::Nurse)
    }

    #[rstest]
    fn non_collapsible_sections_are_always_expanded() {
        let section = NavigationSection::new("main", "Main", Vec::new());
        let mut state = CollapseState::default();

        state.set_collapsed(&section, true);
        assert!(!state.toggle(&section));
        assert!(!state.is_collapsed(&section));
    }

    #[rstest]
    fn remembered_flag_overrides_default(administration: NavigationSection) {
        let mut state = CollapseState::default();
        assert!(state.is_collapsed(&administration));

        state.set_collapsed(&administration, false);
        assert!(!state.is_collapsed(&administration));
    }

    #[rstest]
    fn toggle_flips_from_the_default(administration: NavigationSection) {
        let mut state = CollapseState::default();

        assert!(!state.toggle(&administration));
        assert!(!state.is_collapsed(&administration));
        assert!(state.toggle(&administration));
        assert!(state.is_collapsed(&administration));
    }

    #[rstest]
    fn auto_expand_opens_collapsed_section_with_active_item(
        administration: NavigationSection,
        nurse: CurrentUser,
    ) {
        let grants = GrantedPermissions::new([key("settings.view")]);
        let evaluator = AccessEvaluator::new(&nurse, &grants);
        let mut state = CollapseState::default();

        let changed = state
            .auto_expand_for_route(&evaluator, &administration, "/settings/statuses")
            .expect("lookup succeeds");

        assert!(changed);
        assert!(!state.is_collapsed(&administration));
    }

    #[rstest]
    fn auto_expand_ignores_inaccessible_active_item(
        administration: NavigationSection,
        nurse: CurrentUser,
    ) {
        let grants = GrantedPermissions::new([key("settings.view")]);
        let evaluator = AccessEvaluator::new(&nurse, &grants);
        let mut state = CollapseState::default();

        let changed = state
            .auto_expand_for_route(&evaluator, &administration, "/staff")
            .expect("lookup succeeds");

        assert!(!changed);
        assert!(state.is_collapsed(&administration));
    }

    #[rstest]
    fn auto_expand_never_collapses_an_open_section(
        administration: NavigationSection,
        nurse: CurrentUser,
    ) {
        let grants = GrantedPermissions::default();
        let evaluator = AccessEvaluator::new(&nurse, &grants);
        let mut state = CollapseState::default();
        state.set_collapsed(&administration, false);

        let changed = state
            .auto_expand_for_route(&evaluator, &administration, "/patients")
            .expect("lookup succeeds");

        assert!(!changed);
        assert!(!state.is_collapsed(&administration));
    }

    #[rstest]
    fn serialises_as_plain_map(administration: NavigationSection) {
        let mut state = CollapseState::default();
        state.toggle(&administration);

        let json = serde_json::to_string(&state).expect("serialise");
        assert_eq!(json, r#"{"administration":false}"#);
    }
}
