//! The consumer side: version gating, migration and resolution.
//!
//! Decoding runs in four steps. The bytes are parsed and the version tag is
//! read. An envelope from a newer schema is declined and renders nothing. An
//! older one is carried through the registered migrations. The current-version
//! envelope is then resolved into one canonical tree per region.
//!
//! ```
//! use islet::prelude::*;
//!
//! let encoded = islet::encode(text("Boarding"))?;
//! let regions = Decoder::default().decode(encoded.bytes())?.into_regions();
//! assert!(regions.get(Region::Primary).is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod migrate;
mod resolve;

use indexmap::IndexMap;
use islet_core::Region;
use islet_core::tree::Node;
use islet_core::wire::VERSION_KEY;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

pub use migrate::{Migration, MigrationRegistry, v1_to_v2};
pub use islet_core::wire::MAX_ELEMENT_DEPTH;

use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Canonical trees keyed by region. Absent regions have no content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regions(IndexMap<Region, Node>);

impl Regions {
    /// The tree for `region`.
    #[must_use]
    pub fn get(&self, region: Region) -> Option<&Node> {
        self.0.get(&region)
    }

    /// Iterates in envelope order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &Node)> {
        self.0.iter().map(|(region, node)| (*region, node))
    }

    /// Number of regions with content.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no region has content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, region: Region, node: Node) {
        self.0.insert(region, node);
    }
}

impl Serialize for Regions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (region, node) in &self.0 {
            map.serialize_entry(region.legacy_key(), node)?;
        }
        map.end()
    }
}

impl IntoIterator for Regions {
    type Item = (Region, Node);
    type IntoIter = indexmap::map::IntoIter<Region, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The outcome of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The envelope was understood.
    Ready(Regions),
    /// The envelope comes from a newer schema and was not read.
    UnsupportedVersion {
        /// Version found in the envelope.
        version: u64,
        /// Highest version this decoder reads.
        supported: u32,
    },
}

impl Decoded {
    /// The regions, if the envelope was understood.
    #[must_use]
    pub const fn regions(&self) -> Option<&Regions> {
        match self {
            Self::Ready(regions) => Some(regions),
            Self::UnsupportedVersion { .. } => None,
        }
    }

    /// The regions, empty for a declined envelope.
    #[must_use]
    pub fn into_regions(self) -> Regions {
        match self {
            Self::Ready(regions) => regions,
            Self::UnsupportedVersion { .. } => Regions::default(),
        }
    }
}

/// Reads envelopes.
///
/// Decoding holds no state between calls: the same bytes always produce the
/// same regions.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder.
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The highest schema version this decoder reads.
    #[must_use]
    pub const fn supported_version(&self) -> u32 {
        self.config.migrations.target()
    }

    /// Decodes envelope bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not an envelope or the migration chain is broken.
    /// A newer schema is not an error; it yields [`Decoded::UnsupportedVersion`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded, DecodeError> {
        let envelope: Value = serde_json::from_slice(bytes)?;
        self.decode_value(envelope)
    }

    /// Decodes an already parsed envelope.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_value(&self, envelope: Value) -> Result<Decoded, DecodeError> {
        let Value::Object(map) = &envelope else {
            return Err(DecodeError::NotAnEnvelope);
        };
        let version = map
            .get(VERSION_KEY)
            .and_then(Value::as_u64)
            .ok_or(DecodeError::MissingVersion)?;

        let supported = self.supported_version();
        let version = match u32::try_from(version) {
            Ok(version) if version <= supported => version,
            _ => {
                tracing::warn!(version, supported, "envelope from a newer schema; rendering nothing");
                return Ok(Decoded::UnsupportedVersion { version, supported });
            }
        };

        let envelope = if version < supported {
            self.config.migrations.migrate(envelope, version)?
        } else {
            envelope
        };
        let Value::Object(map) = &envelope else {
            return Err(DecodeError::NotAnEnvelope);
        };
        let regions = resolve::extract(map);
        tracing::debug!(version, regions = regions.len(), "decoded envelope");
        Ok(Decoded::Ready(regions))
    }

    /// Decodes envelope bytes, logging any failure and returning no regions.
    ///
    /// Meant for rendering surfaces where a blank region beats a crash.
    #[must_use]
    pub fn decode_or_empty(&self, bytes: &[u8]) -> Regions {
        match self.decode(bytes) {
            Ok(decoded) => decoded.into_regions(),
            Err(error) => {
                tracing::error!(%error, "failed to decode envelope");
                Regions::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use islet_core::ComponentKind;
    use islet_core::tree::Element;
    use serde_json::json;

    fn decode(envelope: &Value) -> Result<Decoded, DecodeError> {
        Decoder::default().decode(&serde_json::to_vec(envelope).unwrap())
    }

    #[test]
    fn malformed_input_is_an_error() {
        let decoder = Decoder::default();
        assert!(matches!(decoder.decode(b"{"), Err(DecodeError::Json(_))));
        assert!(matches!(decode(&json!([1])), Err(DecodeError::NotAnEnvelope)));
        assert!(matches!(decode(&json!({"p": null})), Err(DecodeError::MissingVersion)));
        assert!(matches!(decode(&json!({"v": "2"})), Err(DecodeError::MissingVersion)));
        assert!(decoder.decode_or_empty(b"not json").is_empty());
    }

    #[test]
    fn newer_versions_render_nothing() {
        for version in [json!(3), json!(u64::MAX)] {
            let decoded = decode(&json!({"v": version, "p": {"t": 6}})).unwrap();
            assert!(matches!(decoded, Decoded::UnsupportedVersion { supported: 2, .. }));
            assert!(decoded.regions().is_none());
            assert!(decoded.into_regions().is_empty());
        }
    }

    #[test]
    fn legacy_envelopes_are_migrated() {
        let decoded = decode(&json!({"v": 1, "primary": {"t": 0, "c": "old"}})).unwrap();
        let expected: Node = Element::new(ComponentKind::Text).with_children("old").into();
        assert_eq!(decoded.regions().and_then(|r| r.get(Region::Primary)), Some(&expected));
    }

    #[test]
    fn missing_steps_are_configuration_errors() {
        let decoder = Decoder::new(DecoderConfig::default().with_migrations(MigrationRegistry::empty(2)));
        let error = decoder
            .decode(&serde_json::to_vec(&json!({"v": 1})).unwrap())
            .unwrap_err();
        assert!(matches!(error, DecodeError::MissingMigration { from: 1, to: 2 }));
    }

    #[test]
    fn regions_serialize_with_long_keys() {
        let regions = decode(&json!({"v": 2, "cl": "x", "p": {"t": 7}}))
            .unwrap()
            .into_regions();
        assert_eq!(
            serde_json::to_value(&regions).unwrap(),
            json!({"compactLeading": "x", "primary": {"type": "Divider"}})
        );
        let order: Vec<_> = regions.into_iter().map(|(region, _)| region).collect();
        assert_eq!(order, [Region::CompactLeading, Region::Primary]);
    }
}
