//! Pure transitions over a collection of configurable entities.
//!
//! Every operation works on a copy and returns the new collection, so a
//! refusal leaves the caller's collection untouched.

use std::collections::BTreeSet;

use serde::Serialize;

use super::error::LifecycleError;
use super::identity::EntityRef;
use super::profile::CatalogueProfile;
use crate::domain::entity::{
    ConfigurableEntity, EntityCode, EntityDraft, EntityId, EntityPatch, LifecycleState,
};

/// An ordered collection of configurable entities.
///
/// Entities are kept sorted ascending by `order`. Records sharing an order
/// are listed in the order they joined the collection: loaded records by
/// their position in the loaded list, created records after all of them.
/// Edits and state changes never move a record within its tie.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EntityCollection {
    entities: Vec<ConfigurableEntity>,
    /// Insertion sequence of the record at the same position.
    #[serde(skip)]
    inserted: Vec<u64>,
}

impl PartialEq for EntityCollection {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
    }
}

impl Eq for EntityCollection {}

/// Result of a mutation targeting a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    /// The collection after the mutation.
    pub collection: EntityCollection,
    /// The affected record as it now stands.
    pub entity: ConfigurableEntity,
}

/// Exhaustive, disjoint split of a collection by lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub active: Vec<ConfigurableEntity>,
    pub deleted: Vec<ConfigurableEntity>,
}

/// Split `entities` into active and deleted records, preserving order.
pub fn partition(entities: &[ConfigurableEntity]) -> Partition {
    let (deleted, active): (Vec<_>, Vec<_>) = entities
        .iter()
        .cloned()
        .partition(ConfigurableEntity::is_deleted);
    Partition { active, deleted }
}

impl EntityCollection {
    /// Wrap `entities`, sorting them by order.
    pub fn new(entities: Vec<ConfigurableEntity>) -> Self {
        let inserted = (0..).take(entities.len()).collect();
        Self::from_parts(entities, inserted)
    }

    fn from_parts(entities: Vec<ConfigurableEntity>, inserted: Vec<u64>) -> Self {
        let mut collection = Self { entities, inserted };
        collection.sort();
        collection
    }

    pub fn entities(&self) -> &[ConfigurableEntity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<ConfigurableEntity> {
        self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The single record matching `reference`.
    pub fn find(&self, reference: &EntityRef) -> Result<&ConfigurableEntity, LifecycleError> {
        self.locate(reference).map(|(_, entity)| entity)
    }

    /// Every record flagged as default, active or not.
    pub fn defaults(&self) -> Vec<&ConfigurableEntity> {
        self.entities
            .iter()
            .filter(|entity| entity.is_default())
            .collect()
    }

    pub fn partition(&self) -> Partition {
        partition(&self.entities)
    }

    /// Add a record built from `draft`.
    ///
    /// A missing code is minted from the profile; a supplied one is kept as
    /// is. A missing order lands one past the current maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clinic_backend::domain::{CatalogueProfile, EntityCollection, EntityDraft};
    /// let profile = CatalogueProfile::appointment_statuses();
    /// let seeded = EntityCollection::new(profile.seed_entities().expect("valid seeds"));
    /// let draft = EntityDraft {
    ///     name: "Waiting Room".into(),
    ///     color: "#9333ea".into(),
    ///     ..EntityDraft::default()
    /// };
    ///
    /// let outcome = seeded.create(draft, &profile).expect("created");
    /// assert_eq!(outcome.entity.code().as_str(), "S007");
    /// assert_eq!(outcome.entity.order(), 7);
    /// ```
    pub fn create(
        &self,
        draft: EntityDraft,
        profile: &CatalogueProfile,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let code = match draft.code {
            Some(code) => EntityCode::new(code)?,
            None => profile.next_code(&self.entities)?,
        };
        let order = draft.order.unwrap_or_else(|| self.next_order());
        let mut entity = ConfigurableEntity::new(
            EntityId::random(),
            code,
            draft.name,
            draft.color,
            order,
        )?
        .with_default(draft.is_default);
        if let Some(description) = draft.description.filter(|text| !text.trim().is_empty()) {
            entity = entity.with_description(description);
        }

        let mut entities = self.entities.clone();
        let mut inserted = self.inserted.clone();
        entities.push(entity.clone());
        inserted.push(self.next_insertion());
        Ok(LifecycleOutcome {
            collection: Self::from_parts(entities, inserted),
            entity,
        })
    }

    /// Patch the display fields of the referenced record. The code is never
    /// changed.
    pub fn update(
        &self,
        reference: &EntityRef,
        patch: &EntityPatch,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let (position, _) = self.locate(reference)?;
        let mut entities = self.entities.clone();
        let target = entities
            .get_mut(position)
            .ok_or_else(|| Self::missing(reference))?;
        target.apply(patch)?;
        let entity = target.clone();
        Ok(LifecycleOutcome {
            collection: Self::from_parts(entities, self.inserted.clone()),
            entity,
        })
    }

    /// Mark the referenced record deleted.
    ///
    /// Defaults are refused before protected codes are checked. Deleting an
    /// already deleted record succeeds without changing anything.
    pub fn soft_delete(
        &self,
        reference: &EntityRef,
        profile: &CatalogueProfile,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let (position, target) = self.locate(reference)?;
        if target.is_default() {
            return Err(LifecycleError::DefaultEntity {
                code: target.code().to_string(),
            });
        }
        if profile.is_protected(target.code()) {
            return Err(LifecycleError::ProtectedEntity {
                code: target.code().to_string(),
            });
        }
        self.with_state(reference, position, LifecycleState::Deleted)
    }

    /// Bring a deleted record back.
    pub fn restore(&self, reference: &EntityRef) -> Result<LifecycleOutcome, LifecycleError> {
        let (position, target) = self.locate(reference)?;
        if !target.is_deleted() {
            return Err(LifecycleError::NotDeleted {
                code: target.code().to_string(),
            });
        }
        self.with_state(reference, position, LifecycleState::Active)
    }

    /// Assign orders `1..=n` following `sequence`, which must reference every
    /// record exactly once.
    pub fn reorder(&self, sequence: &[EntityRef]) -> Result<Self, LifecycleError> {
        if sequence.len() != self.entities.len() {
            return Err(LifecycleError::ReorderMismatch {
                reason: format!(
                    "expected {} references, got {}",
                    self.entities.len(),
                    sequence.len()
                ),
            });
        }

        let mut seen = BTreeSet::new();
        let mut reordered = Vec::with_capacity(sequence.len());
        let mut inserted = Vec::with_capacity(sequence.len());
        for (reference, order) in sequence.iter().zip(1_u32..) {
            let (position, entity) =
                self.locate(reference)
                    .map_err(|error| LifecycleError::ReorderMismatch {
                        reason: error.to_string(),
                    })?;
            if !seen.insert(position) {
                return Err(LifecycleError::ReorderMismatch {
                    reason: format!("{reference} appears more than once"),
                });
            }
            let mut entity = entity.clone();
            entity.set_order(order);
            reordered.push(entity);
            inserted.push(self.insertion_at(position));
        }
        Ok(Self::from_parts(reordered, inserted))
    }

    /// Resolve `reference` to its position and record.
    fn locate(
        &self,
        reference: &EntityRef,
    ) -> Result<(usize, &ConfigurableEntity), LifecycleError> {
        let position = reference.resolve(&self.entities)?;
        let entity = self
            .entities
            .get(position)
            .ok_or_else(|| Self::missing(reference))?;
        Ok((position, entity))
    }

    fn missing(reference: &EntityRef) -> LifecycleError {
        LifecycleError::NotFound {
            reference: reference.to_string(),
        }
    }

    fn with_state(
        &self,
        reference: &EntityRef,
        position: usize,
        state: LifecycleState,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let mut entities = self.entities.clone();
        let target = entities
            .get_mut(position)
            .ok_or_else(|| Self::missing(reference))?;
        target.set_state(state);
        let entity = target.clone();
        Ok(LifecycleOutcome {
            collection: Self::from_parts(entities, self.inserted.clone()),
            entity,
        })
    }

    fn insertion_at(&self, position: usize) -> u64 {
        self.inserted.get(position).copied().unwrap_or(u64::MAX)
    }

    fn next_insertion(&self) -> u64 {
        self.inserted
            .iter()
            .max()
            .map_or(0, |last| last.saturating_add(1))
    }

    fn next_order(&self) -> u32 {
        self.entities
            .iter()
            .map(ConfigurableEntity::order)
            .max()
            .map_or(1, |order| order.saturating_add(1))
    }

    fn sort(&mut self) {
        let entities = std::mem::take(&mut self.entities);
        let inserted = std::mem::take(&mut self.inserted);
        let mut paired: Vec<(u64, ConfigurableEntity)> = entities
            .into_iter()
            .enumerate()
            .map(|(position, entity)| {
                let sequence = inserted.get(position).copied().unwrap_or(u64::MAX);
                (sequence, entity)
            })
            .collect();
        paired.sort_by_key(|(sequence, entity)| (entity.order(), *sequence));
        let (inserted, entities): (Vec<u64>, Vec<ConfigurableEntity>) =
            paired.into_iter().unzip();
        self.inserted = inserted;
        self.entities = entities;
    }
}

impl From<Vec<ConfigurableEntity>> for EntityCollection {
    fn from(entities: Vec<ConfigurableEntity>) -> Self {
        Self::new(entities)
    }
}
