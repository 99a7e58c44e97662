//! # islet-core
//!
//! Shared vocabulary of the islet wire protocol.
//!
//! This crate holds everything the producer and the consumer must agree on:
//!
//! - [`registry`]: the closed component vocabulary and the property short-name table.
//! - [`region`]: the named slots an envelope can fill, with their stable keys.
//! - [`wire`]: the compact envelope as it travels, including references and pool indices.
//! - [`tree`]: the canonical, fully resolved tree a consumer hands to its native surface.
//!
//! Nothing here performs I/O or holds state. The tables are compile-time data, so
//! adding a component or a property is a source change and, when it breaks
//! existing payloads, a schema version bump.

#[macro_use]
mod macros;

pub mod region;
pub mod registry;
pub mod tree;
pub mod wire;

#[doc(inline)]
pub use region::Region;
#[doc(inline)]
pub use registry::ComponentKind;
#[doc(inline)]
pub use wire::{CURRENT_VERSION, Envelope};
