//! Resolving references to records in a collection.
//!
//! Records carry a stable [`EntityId`], which is the preferred way to point
//! at one. Callers that only know the visible fields (for example a settings
//! screen built before ids existed) can fall back to the composite
//! `(code, name, color)`. A composite that matches several records is
//! reported as ambiguous rather than silently picking one.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LifecycleError;
use crate::domain::entity::{ConfigurableEntity, EntityCode, EntityId};

/// Reference to a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id {
        id: EntityId,
    },
    Composite {
        code: EntityCode,
        name: String,
        color: String,
    },
}

impl EntityRef {
    pub fn composite(code: EntityCode, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::Composite {
            code,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Whether `entity` is a candidate for this reference.
    pub fn matches(&self, entity: &ConfigurableEntity) -> bool {
        match self {
            Self::Id { id } => entity.id() == *id,
            Self::Composite { code, name, color } => {
                entity.code() == code && entity.name() == name && entity.color() == color
            }
        }
    }

    /// Position of the single record matching this reference.
    pub fn resolve(&self, entities: &[ConfigurableEntity]) -> Result<usize, LifecycleError> {
        let mut positions = entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| self.matches(entity))
            .map(|(position, _)| position);

        let Some(first) = positions.next() else {
            return Err(LifecycleError::NotFound {
                reference: self.to_string(),
            });
        };
        let extra = positions.count();
        if extra > 0 {
            return Err(LifecycleError::AmbiguousMatch {
                reference: self.to_string(),
                matches: extra + 1,
            });
        }
        Ok(first)
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> Self {
        Self::Id { id }
    }
}

impl From<&ConfigurableEntity> for EntityRef {
    fn from(entity: &ConfigurableEntity) -> Self {
        Self::Id { id: entity.id() }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { id } => write!(f, "id {id}"),
            Self::Composite { code, name, color } => write!(f, "{code}/{name}/{color}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn entity(code: &str, name: &str, color: &str) -> ConfigurableEntity {
        ConfigurableEntity::new(
            EntityId::random(),
            EntityCode::new(code).expect("valid code"),
            name,
            color,
            1,
        )
        .expect("valid entity")
    }

    #[fixture]
    fn pending_pair() -> Vec<ConfigurableEntity> {
        vec![
            entity("S010", "Pending", "#ffffff"),
            entity("S010", "Pending", "#ffffff"),
            entity("S010", "Pending review", "#ffffff"),
        ]
    }

    #[rstest]
    fn id_reference_picks_exact_record(pending_pair: Vec<ConfigurableEntity>) {
        let target = EntityRef::from(&pending_pair[1]);
        assert_eq!(target.resolve(&pending_pair), Ok(1));
    }

    #[rstest]
    fn duplicate_composite_is_ambiguous(pending_pair: Vec<ConfigurableEntity>) {
        let reference = EntityRef::composite(
            EntityCode::new("S010").expect("valid code"),
            "Pending",
            "#ffffff",
        );

        assert_eq!(
            reference.resolve(&pending_pair),
            Err(LifecycleError::AmbiguousMatch {
                reference: "S010/Pending/#ffffff".to_owned(),
                matches: 2,
            })
        );
    }

    #[rstest]
    fn distinct_composite_resolves(pending_pair: Vec<ConfigurableEntity>) {
        let reference = EntityRef::composite(
            EntityCode::new("S010").expect("valid code"),
            "Pending review",
            "#ffffff",
        );
        assert_eq!(reference.resolve(&pending_pair), Ok(2));
    }

    #[rstest]
    fn unknown_id_is_not_found(pending_pair: Vec<ConfigurableEntity>) {
        let result = EntityRef::from(EntityId::random()).resolve(&pending_pair);
        assert!(matches!(result, Err(LifecycleError::NotFound { .. })));
    }

    #[rstest]
    fn deserialises_either_shape() {
        let by_id: EntityRef =
            serde_json::from_str(r#"{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#)
                .expect("id reference");
        assert!(matches!(by_id, EntityRef::Id { .. }));

        let composite: EntityRef =
            serde_json::from_str(r##"{"code":"S003","name":"Arrived","color":"#ca8a04"}"##)
                .expect("composite reference");
        assert!(matches!(composite, EntityRef::Composite { .. }));
    }
}
