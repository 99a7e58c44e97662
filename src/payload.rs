//! Envelope assembly and the size budget.

use indexmap::IndexMap;
use islet_core::Region;
use islet_core::wire::Envelope;

use crate::config::{Budget, EncoderConfig};
use crate::error::EncodeError;
use crate::render::Renderer;
use crate::view::View;

/// The views to encode, one per region.
///
/// ```
/// use islet::prelude::*;
///
/// let payload = Payload::new()
///     .region(Region::Primary, text("Arriving in 5 min"))
///     .region(Region::Minimal, symbol("car.fill"));
/// let encoded = Encoder::default().encode(&payload)?;
/// assert!(encoded.stats().size <= encoded.stats().budget);
/// # Ok::<(), islet::EncodeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Payload {
    regions: IndexMap<Region, View>,
}

impl Payload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the view for `region`.
    #[must_use]
    pub fn region(mut self, region: Region, view: impl Into<View>) -> Self {
        self.insert(region, view);
        self
    }

    /// Sets the view for `region`, replacing any earlier one.
    pub fn insert(&mut self, region: Region, view: impl Into<View>) {
        self.regions.insert(region, view.into());
    }

    /// The view set for `region`.
    #[must_use]
    pub fn get(&self, region: Region) -> Option<&View> {
        self.regions.get(&region)
    }

    /// Iterates regions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &View)> {
        self.regions.iter().map(|(region, view)| (*region, view))
    }

    /// Number of regions set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Figures about one encoded envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    /// Encoded size in bytes.
    pub size: usize,
    /// Effective budget in bytes.
    pub budget: usize,
    /// Regions written.
    pub regions: usize,
    /// Entries in the shared element pool.
    pub shared_elements: usize,
    /// Entries in the shared style pool.
    pub shared_styles: usize,
}

/// An envelope that fits the budget.
#[derive(Debug, Clone)]
pub struct Encoded {
    bytes: Vec<u8>,
    envelope: Envelope,
    stats: EncodeStats,
}

impl Encoded {
    /// The encoded bytes, ready for the transport.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The encoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Takes the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The structured envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Size and pool figures.
    #[must_use]
    pub const fn stats(&self) -> &EncodeStats {
        &self.stats
    }
}

/// Renders payloads into envelopes and enforces the budget.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Creates an encoder.
    #[must_use]
    pub const fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Renders every region of `payload` into one envelope.
    ///
    /// Regions that render nothing are left out. Pools are shared by all
    /// regions and are only written when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Render`] for a tree that cannot be serialized and
    /// [`EncodeError::OverBudget`] when the encoded bytes exceed the effective
    /// budget. Nothing is truncated.
    pub fn encode(&self, payload: &Payload) -> Result<Encoded, EncodeError> {
        let span = tracing::debug_span!("encode", regions = payload.len());
        let _enter = span.enter();

        let mut renderer = Renderer::new(&self.config, payload.iter().map(|(_, view)| view));
        let mut envelope = Envelope::new();
        for (region, view) in payload.iter() {
            let node = renderer.render(view)?;
            if node.is_empty() {
                tracing::trace!(%region, "region rendered nothing; omitted");
                continue;
            }
            envelope.regions.insert(region, node);
        }
        let (shared_elements, shared_styles) = renderer.finish(&mut envelope.regions);
        envelope.shared_elements = shared_elements;
        envelope.shared_styles = shared_styles;

        let bytes = serde_json::to_vec(&envelope)?;
        let stats = EncodeStats {
            size: bytes.len(),
            budget: self.config.budget.effective(),
            regions: envelope.regions.len(),
            shared_elements: envelope.shared_elements.len(),
            shared_styles: envelope.shared_styles.len(),
        };
        check_budget(&self.config.budget, stats.size)?;

        tracing::debug!(
            size = stats.size,
            budget = stats.budget,
            shared_elements = stats.shared_elements,
            shared_styles = stats.shared_styles,
            "encoded envelope"
        );
        Ok(Encoded {
            bytes,
            envelope,
            stats,
        })
    }
}

/// Checks an encoded size against `budget`.
///
/// # Errors
///
/// Returns [`EncodeError::OverBudget`] naming both figures.
pub fn check_budget(budget: &Budget, size: usize) -> Result<(), EncodeError> {
    if budget.fits(size) {
        return Ok(());
    }
    tracing::warn!(size, budget = budget.effective(), "envelope over budget");
    Err(EncodeError::OverBudget {
        size,
        budget: budget.effective(),
    })
}

/// Encodes `view` as the primary region with the default configuration.
///
/// # Errors
///
/// See [`Encoder::encode`].
pub fn encode(view: impl Into<View>) -> Result<Encoded, EncodeError> {
    Encoder::default().encode(&Payload::new().region(Region::Primary, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{spacer, text, vstack};
    use serde_json::{Value, json};

    fn wire(encoded: &Encoded) -> Value {
        serde_json::from_slice(encoded.bytes()).unwrap()
    }

    #[test]
    fn empty_regions_and_pools_are_omitted() {
        let payload = Payload::new()
            .region(Region::Primary, spacer())
            .region(Region::Minimal, View::Empty);
        let encoded = Encoder::default().encode(&payload).unwrap();
        assert_eq!(wire(&encoded), json!({"v": 2, "p": {"t": 6}}));
        assert_eq!(encoded.stats().regions, 1);
        assert_eq!(encoded.as_str(), r#"{"v":2,"p":{"t":6}}"#);
    }

    #[test]
    fn pools_span_regions() {
        let badge: View = text("x").into();
        let payload = Payload::new()
            .region(Region::CompactLeading, badge.clone())
            .region(Region::ExpandedLeading, vstack([badge]));
        let encoded = Encoder::default().encode(&payload).unwrap();
        assert_eq!(
            wire(&encoded),
            json!({"v": 2, "cl": {"$r": 0}, "el": {"t": 1, "c": [{"$r": 0}]}, "e": [{"t": 0, "c": "x"}]})
        );
    }

    #[test]
    fn dedupe_can_be_disabled() {
        let badge: View = text("x").into();
        let config = EncoderConfig::default().with_dedupe(false);
        let encoded = Encoder::new(config)
            .encode(&Payload::new().region(Region::Primary, vstack([badge.clone(), badge])))
            .unwrap();
        assert_eq!(
            wire(&encoded),
            json!({"v": 2, "p": {"t": 1, "c": [{"t": 0, "c": "x"}, {"t": 0, "c": "x"}]}})
        );
    }

    #[test]
    fn budget_is_inclusive() {
        let budget = Budget::new(30, 10);
        assert!(check_budget(&budget, 20).is_ok());
        assert!(matches!(
            check_budget(&budget, 21),
            Err(EncodeError::OverBudget { size: 21, budget: 20 })
        ));
    }
}
