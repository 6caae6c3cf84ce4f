//! `nav` subcommand: the navigation tree as a given role would see it.

use serde::Serialize;

use super::NavArgs;
use crate::domain::ports::GrantedPermissions;
use crate::domain::{
    AccessEvaluator, CollapseState, CurrentUser, DomainError, NavigationSection, UserId,
    clinic_navigation, clinic_permission_catalog,
};

/// A visible section with its resolved collapse state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSectionView {
    pub key: String,
    pub label: String,
    pub collapsed: bool,
    pub items: Vec<NavigationItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItemView {
    pub key: String,
    pub label: String,
    pub active: bool,
}

/// Filter the clinic navigation for `args.role` and the granted keys.
pub fn render_navigation(args: &NavArgs) -> Result<Vec<NavigationSectionView>, DomainError> {
    let catalog = clinic_permission_catalog();
    let sections =
        clinic_navigation(&catalog).map_err(|err| DomainError::internal(err.to_string()))?;
    let user = CurrentUser::new(UserId::random(), args.role);
    let grants = GrantedPermissions::new(args.grants.iter().cloned());
    let evaluator = AccessEvaluator::new(&user, &grants);

    let visible = evaluator.filter_navigation(&sections)?;
    let mut collapse = CollapseState::default();
    let route = args.route.as_deref();

    visible
        .iter()
        .map(|section| -> Result<NavigationSectionView, DomainError> {
            if let Some(route) = route {
                collapse.auto_expand_for_route(&evaluator, section, route)?;
            }
            Ok(view(section, collapse.is_collapsed(section), route))
        })
        .collect()
}

fn view(
    section: &NavigationSection,
    collapsed: bool,
    route: Option<&str>,
) -> NavigationSectionView {
    NavigationSectionView {
        key: section.key().to_owned(),
        label: section.label().to_owned(),
        collapsed,
        items: section
            .items()
            .iter()
            .map(|item| NavigationItemView {
                key: item.key().to_owned(),
                label: item.label().to_owned(),
                active: route.is_some_and(|route| item.matches_route(route)),
            })
            .collect(),
    }
}
