/// Declares the closed component vocabulary.
///
/// Every entry pairs a variant with its wire id and canonical name. The macro
/// generates the enum together with both lookup directions, so the id table
/// and the name table can never drift apart.
///
/// # Usage
///
/// ```ignore
/// components! {
///     /// Displays a run of text.
///     Text = 0 => "Text",
///     /// Stacks children vertically.
///     VStack = 1 => "VStack",
/// }
/// ```
macro_rules! components {
    ($($(#[$meta:meta])* $variant:ident = $id:literal => $name:literal),* $(,)?) => {
        /// A component kind from the closed, schema-versioned vocabulary.
        ///
        /// Wire ids are append-only: a retired kind keeps its id forever and the
        /// id is never handed to a new kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ComponentKind {
            $($(#[$meta])* $variant,)*
        }

        impl ComponentKind {
            /// Every kind known to this schema revision, in id order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Returns the numeric id written to the wire.
            #[must_use]
            pub const fn id(self) -> u16 {
                match self {
                    $(Self::$variant => $id,)*
                }
            }

            /// Looks up a kind by wire id.
            #[must_use]
            pub const fn from_id(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Returns the canonical component name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Looks up a kind by canonical name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

/// Declares the property short-name table.
///
/// One list produces the forward table, the inverse table and the static slice
/// used by tooling to enumerate every entry.
macro_rules! short_names {
    ($($canonical:literal => $short:literal),* $(,)?) => {
        /// Every `(canonical, short)` pair in the table.
        pub const PROPERTY_NAMES: &[(&str, &str)] = &[$(($canonical, $short),)*];

        /// Returns the short wire name for a canonical property or style key.
        #[must_use]
        pub fn short_name(canonical: &str) -> Option<&'static str> {
            match canonical {
                $($canonical => Some($short),)*
                _ => None,
            }
        }

        /// Returns the canonical name for a short wire name.
        #[must_use]
        pub fn canonical_name(short: &str) -> Option<&'static str> {
            match short {
                $($short => Some($canonical),)*
                _ => None,
            }
        }
    };
}
