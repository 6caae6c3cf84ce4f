//! Tests for the lifecycle service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{EntityStoreError, MockEntityStore};
use crate::domain::{ConfigurableEntity, EntityCode, LifecycleState};

fn seeds() -> Vec<ConfigurableEntity> {
    CatalogueProfile::appointment_statuses()
        .seed_entities()
        .expect("valid seeds")
}

fn make_service(store: MockEntityStore) -> EntityLifecycleService<MockEntityStore> {
    EntityLifecycleService::new(Arc::new(store), CatalogueProfile::appointment_statuses())
}

fn reference_for(entities: &[ConfigurableEntity], code: &str) -> EntityRef {
    entities
        .iter()
        .find(|entity| entity.code().as_str() == code)
        .map(EntityRef::from)
        .expect("code present")
}

#[tokio::test]
async fn load_or_seed_persists_defaults_when_store_is_missing() {
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(|| Ok(None));
    store
        .expect_replace_all()
        .withf(|entities| entities.len() == 6 && entities[0].code().as_str() == "S001")
        .times(1)
        .return_once(|_| Ok(()));

    let collection = make_service(store)
        .load_or_seed()
        .await
        .expect("seeded");

    assert_eq!(collection.len(), 6);
    assert_eq!(collection.defaults().len(), 1);
}

#[tokio::test]
async fn load_or_seed_leaves_empty_store_alone_when_seeding_is_disabled() {
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(|| Ok(Some(Vec::new())));
    store.expect_replace_all().never();

    let collection = make_service(store)
        .with_seeding(false)
        .load_or_seed()
        .await
        .expect("loaded");

    assert!(collection.is_empty());
}

#[tokio::test]
async fn load_or_seed_returns_stored_collection() {
    let stored = seeds();
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store.expect_replace_all().never();

    let collection = make_service(store).load_or_seed().await.expect("loaded");
    assert_eq!(collection.len(), 6);
}

#[tokio::test]
async fn soft_delete_persists_updated_collection() {
    let stored = seeds();
    let arrived = reference_for(&stored, "S003");
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store
        .expect_replace_all()
        .withf(|entities| {
            entities
                .iter()
                .filter(|entity| entity.is_deleted())
                .map(|entity| entity.code().as_str())
                .eq(["S003"])
        })
        .times(1)
        .return_once(|_| Ok(()));

    let outcome = make_service(store)
        .soft_delete(&arrived)
        .await
        .expect("deleted");

    assert_eq!(outcome.entity.state(), LifecycleState::Deleted);
}

#[tokio::test]
async fn refused_soft_delete_never_writes() {
    let stored = seeds();
    let confirmed = reference_for(&stored, "S002");
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store.expect_replace_all().never();

    let error = make_service(store)
        .soft_delete(&confirmed)
        .await
        .expect_err("protected");

    assert_eq!(
        error,
        LifecycleError::ProtectedEntity {
            code: "S002".to_owned()
        }
    );
}

#[tokio::test]
async fn create_appends_with_fresh_code() {
    let stored = seeds();
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store
        .expect_replace_all()
        .withf(|entities| entities.len() == 7)
        .times(1)
        .return_once(|_| Ok(()));

    let outcome = make_service(store)
        .create(EntityDraft {
            name: "Waiting Room".to_owned(),
            color: "#9333ea".to_owned(),
            ..EntityDraft::default()
        })
        .await
        .expect("created");

    assert_eq!(
        outcome.entity.code(),
        &EntityCode::new("S007").expect("valid code")
    );
}

#[tokio::test]
async fn restore_reports_not_deleted_for_active_record() {
    let stored = seeds();
    let scheduled = reference_for(&stored, "S001");
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store.expect_replace_all().never();

    let error = make_service(store)
        .restore(&scheduled)
        .await
        .expect_err("not deleted");

    assert_eq!(error.reason(), "not_deleted");
}

#[tokio::test]
async fn store_failures_surface_as_store_errors() {
    let stored = seeds();
    let arrived = reference_for(&stored, "S003");
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store
        .expect_replace_all()
        .times(1)
        .return_once(|_| Err(EntityStoreError::write("disk full")));

    let error = make_service(store)
        .update(
            &arrived,
            &EntityPatch {
                name: Some("Checked In".to_owned()),
                ..EntityPatch::default()
            },
        )
        .await
        .expect_err("write fails");

    assert_eq!(
        error,
        LifecycleError::Store(EntityStoreError::write("disk full"))
    );
}

#[tokio::test]
async fn reorder_persists_new_orders() {
    let stored = seeds();
    let sequence: Vec<EntityRef> = stored.iter().rev().map(EntityRef::from).collect();
    let mut store = MockEntityStore::new();
    store.expect_load().times(1).return_once(move || Ok(Some(stored)));
    store
        .expect_replace_all()
        .withf(|entities| entities[0].code().as_str() == "S006" && entities[0].order() == 1)
        .times(1)
        .return_once(|_| Ok(()));

    let reordered = make_service(store)
        .reorder(&sequence)
        .await
        .expect("reordered");

    assert_eq!(reordered.entities()[5].code().as_str(), "S001");
}
