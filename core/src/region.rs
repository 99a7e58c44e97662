//! Named slots an envelope can fill.

use core::fmt;

use serde::{Serialize, Serializer};

/// A named slot holding one independent node tree.
///
/// A surface shows the primary region in its full presentation and a subset of
/// the companion regions in its compact, minimal and expanded presentations.
/// Region keys are part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// The full-size presentation.
    Primary,
    /// Leading edge of the compact presentation.
    CompactLeading,
    /// Trailing edge of the compact presentation.
    CompactTrailing,
    /// The smallest presentation, shown when several sessions compete for space.
    Minimal,
    /// Leading edge of the expanded presentation.
    ExpandedLeading,
    /// Center of the expanded presentation.
    ExpandedCenter,
    /// Trailing edge of the expanded presentation.
    ExpandedTrailing,
    /// Bottom band of the expanded presentation.
    ExpandedBottom,
}

impl Region {
    /// Every region, in wire order.
    pub const ALL: [Self; 8] = [
        Self::Primary,
        Self::CompactLeading,
        Self::CompactTrailing,
        Self::Minimal,
        Self::ExpandedLeading,
        Self::ExpandedCenter,
        Self::ExpandedTrailing,
        Self::ExpandedBottom,
    ];

    /// Returns the short key used by the current schema.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Primary => "p",
            Self::CompactLeading => "cl",
            Self::CompactTrailing => "ct",
            Self::Minimal => "mi",
            Self::ExpandedLeading => "el",
            Self::ExpandedCenter => "ec",
            Self::ExpandedTrailing => "et",
            Self::ExpandedBottom => "eb",
        }
    }

    /// Returns the long key used by schema version 1.
    #[must_use]
    pub const fn legacy_key(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::CompactLeading => "compactLeading",
            Self::CompactTrailing => "compactTrailing",
            Self::Minimal => "minimal",
            Self::ExpandedLeading => "expandedLeading",
            Self::ExpandedCenter => "expandedCenter",
            Self::ExpandedTrailing => "expandedTrailing",
            Self::ExpandedBottom => "expandedBottom",
        }
    }

    /// Parses either the short key or the legacy long key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|region| region.key() == key || region.legacy_key() == key)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legacy_key())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}
