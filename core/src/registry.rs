//! Static name and id tables shared by the encoder and the decoder.
//!
//! Both tables are part of the wire format. Entries may be appended within a
//! schema version; renaming or removing one requires a version bump and a
//! migration.

use core::fmt;

use serde::{Serialize, Serializer};

components! {
    /// A run of text. The only kind whose children must resolve to a string.
    Text = 0 => "Text",
    /// Stacks children vertically.
    VStack = 1 => "VStack",
    /// Stacks children horizontally.
    HStack = 2 => "HStack",
    /// Overlays children back to front.
    ZStack = 3 => "ZStack",
    /// A bitmap, referenced by name or embedded as data.
    Image = 4 => "Image",
    /// A platform symbol glyph.
    Symbol = 5 => "Symbol",
    /// Flexible empty space.
    Spacer = 6 => "Spacer",
    /// A thin separator line.
    Divider = 7 => "Divider",
    /// A tappable control carrying a deep link.
    Button = 8 => "Button",
    /// Wraps content that opens a URL.
    Link = 9 => "Link",
    /// A two-state switch.
    Toggle = 10 => "Toggle",
    /// A determinate or indeterminate progress indicator.
    Progress = 11 => "Progress",
    /// A self-updating countdown or count-up clock.
    Timer = 12 => "Timer",
    /// A linear color gradient.
    Gradient = 13 => "Gradient",
    /// A circle shape.
    Circle = 14 => "Circle",
    /// A rectangle shape.
    Rectangle = 15 => "Rectangle",
    /// A rectangle with rounded corners.
    RoundedRectangle = 16 => "RoundedRectangle",
    /// A pill shape.
    Capsule = 17 => "Capsule",
    /// Groups children without imposing layout.
    Group = 18 => "Group",
}

impl ComponentKind {
    /// Whether children of this kind must collapse into a single string.
    #[must_use]
    pub const fn renders_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ComponentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.id())
    }
}

/// Canonical name of the style property.
pub const STYLE_PROPERTY: &str = "style";

short_names! {
    // element properties
    "style" => "s",
    "alignment" => "al",
    "spacing" => "sp",
    "source" => "src",
    "systemName" => "sn",
    "resizeMode" => "rm",
    "label" => "lb",
    "tint" => "tn",
    "mask" => "mk",
    "overlay" => "ol",
    "background" => "bg",
    "url" => "u",
    "deepLink" => "dl",
    "numberOfLines" => "nl",
    "cornerRadius" => "cr",
    "isOn" => "on",
    "value" => "va",
    "total" => "tt",
    "endsAt" => "ea",
    "countsDown" => "cd",
    "startColor" => "sc",
    "endColor" => "ec",
    "direction" => "dr",
    "accessibilityLabel" => "ax",
    "fill" => "fl",
    "stroke" => "sk",
    "minLength" => "ml",
    // style keys
    "width" => "w",
    "height" => "h",
    "minWidth" => "mnw",
    "maxWidth" => "mxw",
    "minHeight" => "mnh",
    "maxHeight" => "mxh",
    "aspectRatio" => "ar",
    "padding" => "pd",
    "paddingHorizontal" => "ph",
    "paddingVertical" => "pv",
    "paddingTop" => "pt",
    "paddingBottom" => "pb",
    "paddingLeft" => "pl",
    "paddingRight" => "pr",
    "margin" => "m",
    "marginHorizontal" => "mh",
    "marginVertical" => "mv",
    "backgroundColor" => "bc",
    "color" => "c",
    "tintColor" => "tc",
    "opacity" => "op",
    "borderRadius" => "br",
    "borderWidth" => "bw",
    "borderColor" => "bdc",
    "fontSize" => "fs",
    "fontWeight" => "fw",
    "fontFamily" => "ff",
    "fontVariant" => "fv",
    "textAlign" => "ta",
    "lineHeight" => "lh",
    "letterSpacing" => "lsp",
    "flex" => "f",
    "flexDirection" => "fd",
    "alignItems" => "ai",
    "alignSelf" => "as",
    "justifyContent" => "jc",
    "gap" => "g",
    "overflow" => "of",
    "position" => "ps",
    "top" => "tp",
    "bottom" => "bt",
    "left" => "lf",
    "right" => "rt",
    "zIndex" => "zi",
    "shadowColor" => "shc",
    "shadowOpacity" => "sho",
    "shadowRadius" => "shr",
}

/// Compresses a canonical name, passing unknown names through unchanged.
///
/// A name outside the table that equals a short name would expand to a
/// different name on decode. Producers reject those with
/// [`is_reserved_name`] before compressing.
#[must_use]
pub fn compress_name(canonical: &str) -> &str {
    short_name(canonical).unwrap_or(canonical)
}

/// Whether `name` is a short wire name but not a canonical one.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    short_name(name).is_none() && canonical_name(name).is_some()
}

/// Expands a short wire name, passing unknown names through unchanged.
#[must_use]
pub fn expand_name(short: &str) -> &str {
    canonical_name(short).unwrap_or(short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn component_ids_are_unique_and_round_trip() {
        let mut ids = HashSet::new();
        for kind in ComponentKind::ALL {
            assert!(ids.insert(kind.id()), "duplicate id {}", kind.id());
            assert_eq!(ComponentKind::from_id(kind.id()), Some(*kind));
            assert_eq!(ComponentKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(ComponentKind::from_id(999), None);
    }

    #[test]
    fn short_name_table_is_bijective() {
        let mut canonical = HashSet::new();
        let mut short = HashSet::new();
        for (long, compact) in PROPERTY_NAMES {
            assert!(canonical.insert(*long), "duplicate canonical name {long}");
            assert!(short.insert(*compact), "duplicate short name {compact}");
            assert!(compact.len() < long.len() || long.len() <= 3);
            assert_eq!(short_name(long), Some(*compact));
            assert_eq!(canonical_name(compact), Some(*long));
        }
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(compress_name("someFutureProp"), "someFutureProp");
        assert_eq!(expand_name("zz"), "zz");
        assert_eq!(compress_name("backgroundColor"), "bc");
        assert_eq!(expand_name("bc"), "backgroundColor");
    }

    #[test]
    fn short_names_are_reserved() {
        assert!(is_reserved_name("u"));
        assert!(is_reserved_name("c"));
        assert!(!is_reserved_name("url"));
        assert!(!is_reserved_name("someFutureProp"));
        for (long, _) in PROPERTY_NAMES {
            assert!(!is_reserved_name(long), "{long} is canonical");
        }
    }

    #[test]
    fn only_text_renders_text() {
        let text_kinds: Vec<_> = ComponentKind::ALL
            .iter()
            .filter(|kind| kind.renders_text())
            .collect();
        assert_eq!(text_kinds, [&ComponentKind::Text]);
    }
}
