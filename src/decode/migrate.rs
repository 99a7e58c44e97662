//! Schema migrations.
//!
//! A migration turns an envelope of version `N` into version `N + 1`. The
//! registry chains them up to its target version and stamps the new version
//! after every step, so a step only rewrites content.

use std::collections::BTreeMap;

use islet_core::Region;
use islet_core::wire::{CURRENT_VERSION, VERSION_KEY};
use serde_json::{Map, Value};

use crate::error::{DecodeError, MigrationError};

/// One migration step.
pub type Migration = fn(Value) -> Result<Value, MigrationError>;

/// Append-only table of single-step migrations.
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
    target: u32,
    steps: BTreeMap<u32, Migration>,
}

impl MigrationRegistry {
    /// A registry with no steps, migrating up to `target`.
    #[must_use]
    pub const fn empty(target: u32) -> Self {
        Self {
            target,
            steps: BTreeMap::new(),
        }
    }

    /// Registers the step from `from` to `from + 1`.
    #[must_use]
    pub fn with_step(mut self, from: u32, step: Migration) -> Self {
        self.steps.insert(from, step);
        self
    }

    /// The highest version this registry produces.
    #[must_use]
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// Whether a step starting at `from` is registered.
    #[must_use]
    pub fn has_step(&self, from: u32) -> bool {
        self.steps.contains_key(&from)
    }

    /// Upgrades `envelope` from `from` to the target version.
    ///
    /// The whole chain is checked before any step runs.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingMigration`] for a gap in the chain and
    /// [`DecodeError::Migration`] when a step fails.
    pub fn migrate(&self, mut envelope: Value, from: u32) -> Result<Value, DecodeError> {
        if let Some(gap) = (from..self.target).find(|version| !self.has_step(*version)) {
            tracing::error!(
                from = gap,
                to = gap + 1,
                target = self.target,
                "migration chain has a gap"
            );
            return Err(DecodeError::MissingMigration {
                from: gap,
                to: gap + 1,
            });
        }

        for (&version, step) in self.steps.range(from..self.target) {
            envelope = step(envelope).map_err(|source| DecodeError::Migration {
                from: version,
                source,
            })?;
            let Value::Object(map) = &mut envelope else {
                return Err(DecodeError::Migration {
                    from: version,
                    source: MigrationError::NotAnObject,
                });
            };
            map.insert(VERSION_KEY.to_owned(), Value::from(version + 1));
            tracing::debug!(from = version, to = version + 1, "migrated envelope");
        }
        Ok(envelope)
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::empty(CURRENT_VERSION).with_step(1, v1_to_v2)
    }
}

/// Version 1 keyed regions by their long names.
///
/// # Errors
///
/// Fails when the envelope is not an object.
pub fn v1_to_v2(envelope: Value) -> Result<Value, MigrationError> {
    let Value::Object(map) = envelope else {
        return Err(MigrationError::NotAnObject);
    };
    let mut migrated = Map::with_capacity(map.len());
    for (key, value) in map {
        let key = match Region::from_key(&key) {
            Some(region) => region.key().to_owned(),
            None => key,
        };
        if migrated.contains_key(&key) {
            return Err(MigrationError::Invalid(format!(
                "region `{key}` appears under both its long and short key"
            )));
        }
        migrated.insert(key, value);
    }
    Ok(Value::Object(migrated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag(envelope: Value) -> Result<Value, MigrationError> {
        let Value::Object(mut map) = envelope else {
            return Err(MigrationError::NotAnObject);
        };
        let trail = map
            .get("trail")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let version = map.get("v").and_then(Value::as_u64).unwrap_or_default();
        map.insert("trail".into(), Value::from(format!("{trail}{version}")));
        Ok(Value::Object(map))
    }

    fn scalar(_: Value) -> Result<Value, MigrationError> {
        Ok(json!(5))
    }

    #[test]
    fn renames_legacy_region_keys() {
        let migrated = v1_to_v2(json!({
            "v": 1,
            "primary": {"t": 0, "c": "hi"},
            "compactTrailing": null,
            "extra": true
        }))
        .unwrap();
        assert_eq!(
            migrated,
            json!({"v": 1, "p": {"t": 0, "c": "hi"}, "ct": null, "extra": true})
        );
        assert!(matches!(
            v1_to_v2(json!({"primary": 1, "p": 2})),
            Err(MigrationError::Invalid(_))
        ));
    }

    #[test]
    fn steps_run_in_order_and_stamp_versions() {
        let registry = MigrationRegistry::empty(4)
            .with_step(3, tag)
            .with_step(1, tag)
            .with_step(2, tag);
        let migrated = registry.migrate(json!({"v": 1}), 1).unwrap();
        assert_eq!(migrated, json!({"v": 4, "trail": "123"}));

        let untouched = registry.migrate(json!({"v": 4}), 4).unwrap();
        assert_eq!(untouched, json!({"v": 4}));
    }

    #[test]
    fn gaps_are_reported_before_running() {
        let registry = MigrationRegistry::empty(3).with_step(1, scalar);
        assert!(matches!(
            registry.migrate(json!({"v": 1}), 1),
            Err(DecodeError::MissingMigration { from: 2, to: 3 })
        ));
        assert!(matches!(
            MigrationRegistry::default().migrate(json!({"v": 0}), 0),
            Err(DecodeError::MissingMigration { from: 0, to: 1 })
        ));
    }

    #[test]
    fn steps_must_return_objects() {
        let registry = MigrationRegistry::empty(2).with_step(1, scalar);
        assert!(matches!(
            registry.migrate(json!({"v": 1}), 1),
            Err(DecodeError::Migration {
                from: 1,
                source: MigrationError::NotAnObject
            })
        ));
    }
}
