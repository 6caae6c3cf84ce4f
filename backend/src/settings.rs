//! Clinic settings loaded via OrthoConfig.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DomainError;

const DEFAULT_STORE_DIR: &str = "data";
const DEFAULT_STATUSES_FILE: &str = "appointment_statuses.json";
const DEFAULT_SEED_DEFAULTS: bool = true;

/// Where configurable entity collections are persisted and how empty stores
/// are initialised.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct ClinicSettings {
    /// Directory holding the persisted collections.
    pub store_dir: Option<PathBuf>,
    /// File name of the appointment status collection.
    pub statuses_file: Option<String>,
    /// Seed the default statuses when the store is empty or missing.
    pub seed_defaults: Option<bool>,
}

impl ClinicSettings {
    /// Load settings from configuration files and the environment only.
    pub fn load_from_environment() -> Result<Self, DomainError> {
        Self::load_from_iter([OsString::from("clinic-settings")]).map_err(|err| {
            DomainError::invalid_request(format!("invalid clinic settings: {err}"))
        })
    }

    /// Return the configured store directory, falling back to `./data`.
    pub fn store_dir(&self) -> &Path {
        self.store_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_STORE_DIR))
    }

    /// Return the configured statuses file name, falling back to the default.
    pub fn statuses_file(&self) -> &str {
        self.statuses_file
            .as_deref()
            .unwrap_or(DEFAULT_STATUSES_FILE)
    }

    /// Whether an empty store is seeded, `true` unless configured otherwise.
    pub fn seed_defaults(&self) -> bool {
        self.seed_defaults.unwrap_or(DEFAULT_SEED_DEFAULTS)
    }
}
