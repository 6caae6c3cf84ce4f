//! Tests for command parsing and dispatch.

use std::sync::Arc;

use super::*;
use crate::domain::ports::MockEntityStore;
use crate::domain::{CatalogueProfile, ConfigurableEntity, ErrorCode};
use rstest::rstest;

const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("clinic-settings").chain(args.iter().copied()))
}

fn seeds() -> Vec<ConfigurableEntity> {
    CatalogueProfile::appointment_statuses()
        .seed_entities()
        .expect("valid seeds")
}

fn service_over(entities: Vec<ConfigurableEntity>) -> EntityLifecycleService<MockEntityStore> {
    let mut store = MockEntityStore::new();
    store
        .expect_load()
        .times(1)
        .return_once(move || Ok(Some(entities)));
    store.expect_replace_all().never();
    EntityLifecycleService::new(Arc::new(store), CatalogueProfile::appointment_statuses())
}

fn nav(args: &[&str]) -> NavArgs {
    let mut full = vec!["nav"];
    full.extend_from_slice(args);
    match parse(&full).expect("valid nav arguments").command {
        Command::Nav(args) => args,
        other => panic!("expected nav command, got {other:?}"),
    }
}

#[rstest]
fn edit_accepts_explicit_default_flag() {
    let cli = parse(&["edit", ID, "--default", "false", "--name", "Booked"]).expect("parses");

    let Command::Edit(args) = cli.command else {
        panic!("expected edit command");
    };
    let patch = EntityPatch::from(&args);
    assert_eq!(patch.is_default, Some(false));
    assert_eq!(patch.name.as_deref(), Some("Booked"));
    assert_eq!(patch.code, None);
}

#[rstest]
#[case::reorder_without_ids(&["reorder"])]
#[case::bad_id(&["delete", "S001"])]
#[case::bad_grant(&["nav", "--role", "nurse", "--grant", "Patients"])]
#[case::unknown_role(&["nav", "--role", "janitor"])]
fn rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(parse(args).is_err());
}

#[rstest]
#[tokio::test]
async fn list_prints_active_statuses_in_order() {
    let output = run(Command::List { deleted: false }, &service_over(seeds()))
        .await
        .expect("listed");

    let codes: Vec<&str> = output
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|entity| entity["code"].as_str())
        .collect();
    assert_eq!(codes, ["S001", "S002", "S003", "S004", "S005", "S006"]);
}

#[rstest]
#[tokio::test]
async fn deleting_protected_status_is_forbidden() {
    let entities = seeds();
    let completed = entities[3].id();

    let error = run(Command::Delete { id: completed }, &service_over(entities))
        .await
        .expect_err("protected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
fn receptionist_sees_only_granted_items() {
    let sections = render_navigation(&nav(&[
        "--role",
        "receptionist",
        "--grant",
        "appointments.view",
        "--grant",
        "payments.view",
        "--route",
        "/billing/payments",
    ]))
    .expect("rendered");

    let keys: Vec<&str> = sections.iter().map(|section| section.key.as_str()).collect();
    assert_eq!(keys, ["main", "billing", "help"]);

    let billing = &sections[1];
    let routes: Vec<&str> = billing.items.iter().map(|item| item.key.as_str()).collect();
    assert_eq!(routes, ["/billing", "/billing/payments"]);
    assert!(billing.items[1].active);
    assert!(!billing.collapsed);
}

#[rstest]
fn admin_sees_every_section_with_defaults_applied() {
    let sections = render_navigation(&nav(&["--role", "admin"])).expect("rendered");

    assert_eq!(sections.len(), 5);
    let administration = sections
        .iter()
        .find(|section| section.key == "administration")
        .expect("administration visible");
    assert!(administration.collapsed);
}

#[rstest]
fn route_expands_collapsed_section() {
    let sections = render_navigation(&nav(&["--role", "super_admin", "--route", "/staff"]))
        .expect("rendered");

    let administration = sections
        .iter()
        .find(|section| section.key == "administration")
        .expect("administration visible");
    assert!(!administration.collapsed);
}
