//! Lifecycle service: runs collection transitions against a store.
//!
//! Each mutation is a full read, transition and replace cycle. Nothing is
//! written when a transition is refused.

use std::sync::Arc;

use tracing::{info, warn};

use super::collection::{EntityCollection, LifecycleOutcome, Partition};
use super::error::LifecycleError;
use super::identity::EntityRef;
use super::profile::CatalogueProfile;
use crate::domain::entity::{EntityDraft, EntityPatch};
use crate::domain::ports::EntityStore;

/// Drives the Entity Lifecycle Manager for one catalogue profile.
#[derive(Clone)]
pub struct EntityLifecycleService<S> {
    store: Arc<S>,
    profile: CatalogueProfile,
    seed_defaults: bool,
}

impl<S> EntityLifecycleService<S> {
    /// Create a service that seeds the profile defaults into an empty store.
    pub fn new(store: Arc<S>, profile: CatalogueProfile) -> Self {
        Self {
            store,
            profile,
            seed_defaults: true,
        }
    }

    /// Enable or disable seeding of an empty store.
    pub fn with_seeding(mut self, seed_defaults: bool) -> Self {
        self.seed_defaults = seed_defaults;
        self
    }

    pub fn profile(&self) -> &CatalogueProfile {
        &self.profile
    }
}

impl<S> EntityLifecycleService<S>
where
    S: EntityStore,
{
    /// Load the persisted collection, seeding it first when the store is
    /// empty and seeding is enabled.
    pub async fn load_or_seed(&self) -> Result<EntityCollection, LifecycleError> {
        let stored = self.store.load().await?;
        match stored {
            Some(entities) if !entities.is_empty() => Ok(EntityCollection::new(entities)),
            _ if self.seed_defaults => {
                let seeded = EntityCollection::new(self.profile.seed_entities()?);
                self.store.replace_all(seeded.entities()).await?;
                info!(
                    kind = self.profile.kind(),
                    count = seeded.len(),
                    "seeded default entities"
                );
                Ok(seeded)
            }
            _ => Ok(EntityCollection::default()),
        }
    }

    /// Active and deleted records of the persisted collection.
    pub async fn partition(&self) -> Result<Partition, LifecycleError> {
        Ok(self.load_or_seed().await?.partition())
    }

    pub async fn create(&self, draft: EntityDraft) -> Result<LifecycleOutcome, LifecycleError> {
        let current = self.load_or_seed().await?;
        let outcome = self.refusal_logged("create", current.create(draft, &self.profile))?;
        self.commit("entity created", outcome).await
    }

    pub async fn update(
        &self,
        reference: &EntityRef,
        patch: &EntityPatch,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let current = self.load_or_seed().await?;
        let outcome = self.refusal_logged("update", current.update(reference, patch))?;
        self.commit("entity updated", outcome).await
    }

    pub async fn soft_delete(
        &self,
        reference: &EntityRef,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let current = self.load_or_seed().await?;
        let outcome =
            self.refusal_logged("soft_delete", current.soft_delete(reference, &self.profile))?;
        self.commit("entity soft-deleted", outcome).await
    }

    pub async fn restore(&self, reference: &EntityRef) -> Result<LifecycleOutcome, LifecycleError> {
        let current = self.load_or_seed().await?;
        let outcome = self.refusal_logged("restore", current.restore(reference))?;
        self.commit("entity restored", outcome).await
    }

    pub async fn reorder(&self, sequence: &[EntityRef]) -> Result<EntityCollection, LifecycleError> {
        let current = self.load_or_seed().await?;
        let reordered = self.refusal_logged("reorder", current.reorder(sequence))?;
        self.store.replace_all(reordered.entities()).await?;
        info!(
            kind = self.profile.kind(),
            count = reordered.len(),
            "entities reordered"
        );
        self.warn_on_multiple_defaults(&reordered);
        Ok(reordered)
    }

    async fn commit(
        &self,
        message: &'static str,
        outcome: LifecycleOutcome,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.store.replace_all(outcome.collection.entities()).await?;
        info!(
            kind = self.profile.kind(),
            entity_id = %outcome.entity.id(),
            entity_code = %outcome.entity.code(),
            "{message}"
        );
        self.warn_on_multiple_defaults(&outcome.collection);
        Ok(outcome)
    }

    fn refusal_logged<T>(
        &self,
        operation: &'static str,
        result: Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        result.inspect_err(|error| {
            warn!(
                kind = self.profile.kind(),
                operation,
                reason = error.reason(),
                %error,
                "lifecycle operation refused"
            );
        })
    }

    fn warn_on_multiple_defaults(&self, collection: &EntityCollection) {
        let defaults = collection.defaults();
        if defaults.len() > 1 {
            let codes: Vec<&str> = defaults
                .iter()
                .map(|entity| entity.code().as_str())
                .collect();
            warn!(
                kind = self.profile.kind(),
                ?codes,
                "collection has more than one default entity"
            );
        }
    }
}

#[cfg(test)]
mod tests;
