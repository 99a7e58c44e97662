//! Error types for encoding and decoding.

use thiserror::Error;

/// A tree that cannot be rendered. Rendering stops at the first one.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A bare value outside a text component.
    #[error("{value} must be wrapped in a Text component (found inside {parent})")]
    TypeKind {
        /// Description of the offending value.
        value: String,
        /// The nearest enclosing element or component.
        parent: String,
    },
    /// Text children that do not collapse to a string.
    #[error("children of {component} must resolve to text, found {found}")]
    TextContent {
        /// The text-rendering component.
        component: String,
        /// What was found instead.
        found: String,
    },
    /// A platform-native primitive.
    #[error("host component `{0}` is not supported; build the tree from the component vocabulary")]
    HostComponent(String),
    /// A class-style component.
    #[error("class component `{0}` is not supported; use a function component")]
    ClassComponent(String),
    /// A built-in wrapper with no single-pass meaning.
    #[error("{0} is not supported when serializing")]
    UnsupportedWrapper(&'static str),
    /// A component or loader that did not finish synchronously.
    #[error("component `{0}` suspended; rendering is synchronous")]
    Suspended(String),
    /// A property value of the wrong shape for its name.
    #[error("property `{prop}` of {component} has an unsupported value")]
    InvalidProp {
        /// The component carrying the property.
        component: String,
        /// The property name.
        prop: String,
    },
    /// A property or style key that collides with a short wire name.
    #[error("`{name}` on {component} is reserved as a short wire name; use the full name")]
    ReservedName {
        /// The component carrying the property.
        component: String,
        /// The colliding name.
        name: String,
    },
    /// Elements nested deeper than a consumer resolves.
    #[error("{component} is nested more than {max} elements deep")]
    TooDeep {
        /// The component that crossed the limit.
        component: String,
        /// The nesting limit.
        max: usize,
    },
}

/// Failure to produce an envelope.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The tree could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The envelope could not be serialized.
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The encoded envelope does not fit.
    #[error(
        "payload is {size} bytes but the budget is {budget} bytes; trim images, text or node count"
    )]
    OverBudget {
        /// Encoded size in bytes.
        size: usize,
        /// Effective budget in bytes.
        budget: usize,
    },
}

/// Failure of a single migration step.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The step received something other than an object.
    #[error("envelope is not an object")]
    NotAnObject,
    /// The step found content it cannot convert.
    #[error("{0}")]
    Invalid(String),
}

/// Failure to read an envelope. Any of these stops the whole decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not JSON.
    #[error("envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is not an object.
    #[error("envelope is not a JSON object")]
    NotAnEnvelope,
    /// The document has no integer version.
    #[error("envelope has no integer version")]
    MissingVersion,
    /// The migration chain has a gap. This is a decoder configuration defect.
    #[error("no migration registered from schema version {from} to {to}")]
    MissingMigration {
        /// Version lacking a step.
        from: u32,
        /// Version the step should produce.
        to: u32,
    },
    /// A migration step failed.
    #[error("migration from schema version {from} failed")]
    Migration {
        /// Version the step started from.
        from: u32,
        /// What went wrong.
        #[source]
        source: MigrationError,
    },
}
