//! Catalogue profiles: per-kind rules for configurable entities.

use std::collections::BTreeSet;

use crate::domain::entity::{ConfigurableEntity, EntityCode, EntityId, EntityValidationError};

/// A record seeded into an empty collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntity {
    pub code: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub is_default: bool,
}

/// Rules for one kind of configurable entity.
///
/// The profile fixes how fresh codes are minted, which codes can never be
/// soft-deleted, and what an empty store is seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueProfile {
    kind: String,
    code_prefix: String,
    protected: BTreeSet<EntityCode>,
    seeds: Vec<SeedEntity>,
}

impl CatalogueProfile {
    /// Build a profile, validating the prefix and protected codes.
    pub fn new(
        kind: impl Into<String>,
        code_prefix: impl Into<String>,
        protected: impl IntoIterator<Item = &'static str>,
        seeds: Vec<SeedEntity>,
    ) -> Result<Self, EntityValidationError> {
        let code_prefix = code_prefix.into();
        EntityCode::new(code_prefix.clone())?;
        let protected = protected
            .into_iter()
            .map(EntityCode::new)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            kind: kind.into(),
            code_prefix,
            protected,
            seeds,
        })
    }

    /// Appointment statuses as configured for every clinic.
    pub fn appointment_statuses() -> Self {
        Self {
            kind: "appointment_statuses".to_owned(),
            code_prefix: "S".to_owned(),
            protected: ["S001", "S002", "S004", "S005"]
                .into_iter()
                .filter_map(|code| EntityCode::new(code).ok())
                .collect(),
            seeds: vec![
                SeedEntity {
                    code: "S001",
                    name: "Scheduled",
                    color: "#2563eb",
                    is_default: true,
                },
                SeedEntity {
                    code: "S002",
                    name: "Confirmed",
                    color: "#0891b2",
                    is_default: false,
                },
                SeedEntity {
                    code: "S003",
                    name: "Arrived",
                    color: "#ca8a04",
                    is_default: false,
                },
                SeedEntity {
                    code: "S004",
                    name: "Completed",
                    color: "#16a34a",
                    is_default: false,
                },
                SeedEntity {
                    code: "S005",
                    name: "Cancelled",
                    color: "#dc2626",
                    is_default: false,
                },
                SeedEntity {
                    code: "S006",
                    name: "No Show",
                    color: "#6b7280",
                    is_default: false,
                },
            ],
        }
    }

    /// Name of the entity kind, used in logs.
    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    pub fn code_prefix(&self) -> &str {
        self.code_prefix.as_str()
    }

    pub fn is_protected(&self, code: &EntityCode) -> bool {
        self.protected.contains(code)
    }

    pub fn protected_codes(&self) -> impl Iterator<Item = &EntityCode> {
        self.protected.iter()
    }

    /// Build the seed collection with fresh ids and orders `1..=n`.
    pub fn seed_entities(&self) -> Result<Vec<ConfigurableEntity>, EntityValidationError> {
        self.seeds
            .iter()
            .zip(1_u32..)
            .map(|(seed, order)| {
                Ok(ConfigurableEntity::new(
                    EntityId::random(),
                    EntityCode::new(seed.code)?,
                    seed.name,
                    seed.color,
                    order,
                )?
                .with_default(seed.is_default))
            })
            .collect()
    }

    /// Mint the next unused code: the prefix followed by one past the
    /// highest numeric suffix in `existing`, zero-padded to three digits.
    ///
    /// Deleted records count too, so codes are never reused.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clinic_backend::domain::CatalogueProfile;
    /// let profile = CatalogueProfile::appointment_statuses();
    /// let seeds = profile.seed_entities().expect("valid seeds");
    ///
    /// assert_eq!(profile.next_code(&seeds).expect("valid code").as_str(), "S007");
    /// ```
    pub fn next_code(
        &self,
        existing: &[ConfigurableEntity],
    ) -> Result<EntityCode, EntityValidationError> {
        let highest = existing
            .iter()
            .filter_map(|entity| {
                entity
                    .code()
                    .as_str()
                    .strip_prefix(self.code_prefix.as_str())
                    .and_then(|suffix| suffix.parse::<u32>().ok())
            })
            .max()
            .unwrap_or(0);
        EntityCode::new(format!(
            "{}{:03}",
            self.code_prefix,
            highest.saturating_add(1)
        ))
    }
}
