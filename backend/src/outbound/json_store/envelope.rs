//! Versioned on-disk layout of an entity collection.
//!
//! Version 1 wraps the records in `{"version": 1, "entities": [...]}`.
//! Version 0 is the legacy bare array; its records may lack an `id` or an
//! `order` and are migrated when read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::EntityStoreError;
use crate::domain::{ConfigurableEntity, EntityCode, EntityId, LifecycleState};

/// Layout version written by this build.
pub const SUPPORTED_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    entities: &'a [ConfigurableEntity],
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    entities: Vec<ConfigurableEntity>,
}

/// A record as written before ids and explicit orders existed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    #[serde(default)]
    id: Option<EntityId>,
    code: String,
    name: String,
    color: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    is_deleted: bool,
}

pub(crate) fn encode(entities: &[ConfigurableEntity]) -> Result<String, EntityStoreError> {
    serde_json::to_string_pretty(&EnvelopeRef {
        version: SUPPORTED_VERSION,
        entities,
    })
    .map_err(|err| EntityStoreError::write(format!("failed to encode collection: {err}")))
}

pub(crate) fn decode(contents: &str) -> Result<Vec<ConfigurableEntity>, EntityStoreError> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|err| EntityStoreError::malformed(err.to_string()))?;

    if value.is_array() {
        return migrate_legacy(value);
    }
    if !value.is_object() {
        return Err(EntityStoreError::malformed(
            "expected an object or a legacy array",
        ));
    }

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| EntityStoreError::malformed("missing numeric `version` field"))?;
    if version != u64::from(SUPPORTED_VERSION) {
        return Err(EntityStoreError::UnsupportedVersion {
            supported: SUPPORTED_VERSION,
            actual: u32::try_from(version).unwrap_or(u32::MAX),
        });
    }
    let envelope: Envelope = serde_json::from_value(value)
        .map_err(|err| EntityStoreError::malformed(err.to_string()))?;
    Ok(envelope.entities)
}

fn migrate_legacy(value: Value) -> Result<Vec<ConfigurableEntity>, EntityStoreError> {
    let records: Vec<LegacyRecord> = serde_json::from_value(value)
        .map_err(|err| EntityStoreError::malformed(err.to_string()))?;

    records
        .into_iter()
        .zip(1_u32..)
        .map(|(record, position)| {
            let state = if record.is_deleted {
                LifecycleState::Deleted
            } else {
                LifecycleState::Active
            };
            let code = EntityCode::new(record.code)
                .map_err(|err| EntityStoreError::malformed(err.to_string()))?;
            let entity = ConfigurableEntity::new(
                record.id.unwrap_or_else(EntityId::random),
                code,
                record.name,
                record.color,
                record.order.unwrap_or(position),
            )
            .map_err(|err| EntityStoreError::malformed(err.to_string()))?
            .with_default(record.is_default)
            .with_state(state);
            Ok(match record.description {
                Some(description) => entity.with_description(description),
                None => entity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn writes_current_version() {
        let entities = crate::domain::CatalogueProfile::appointment_statuses()
            .seed_entities()
            .expect("valid seeds");

        let encoded = encode(&entities).expect("encode");
        let value: Value = serde_json::from_str(&encoded).expect("json");

        assert_eq!(value["version"], json!(1));
        assert_eq!(value["entities"].as_array().map(Vec::len), Some(6));
        assert_eq!(decode(&encoded).expect("decode"), entities);
    }

    #[rstest]
    fn migrates_legacy_array() {
        let legacy = json!([
            { "code": "S001", "name": "Scheduled", "color": "#2563eb", "isDefault": true },
            { "code": "S003", "name": "Arrived", "color": "#ca8a04", "order": 7,
              "isDeleted": true, "isActive": false },
        ])
        .to_string();

        let entities = decode(&legacy).expect("migrated");

        assert_eq!(entities[0].order(), 1);
        assert!(entities[0].is_default());
        assert_eq!(entities[1].order(), 7);
        assert!(entities[1].is_deleted());
        assert_ne!(entities[0].id(), entities[1].id());
    }

    #[rstest]
    fn refuses_unknown_version() {
        let result = decode(r#"{"version": 2, "entities": []}"#);
        assert_eq!(
            result,
            Err(EntityStoreError::UnsupportedVersion {
                supported: 1,
                actual: 2,
            })
        );
    }

    #[rstest]
    #[case::not_json("{")]
    #[case::scalar("42")]
    #[case::missing_version(r#"{"entities": []}"#)]
    #[case::legacy_without_code(r##"[{"name": "Scheduled", "color": "#fff"}]"##)]
    fn rejects_malformed_payloads(#[case] contents: &str) {
        assert!(matches!(
            decode(contents),
            Err(EntityStoreError::Malformed { .. })
        ));
    }
}
