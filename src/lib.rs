#![doc = include_str!("../README.md")]

#[macro_use]
mod macros;
pub mod component;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod payload;
pub mod render;
pub mod view;


#[doc(inline)]
pub use config::{Budget, DecoderConfig, EncoderConfig};
#[doc(inline)]
pub use decode::{Decoded, Decoder, Regions};
#[doc(inline)]
pub use error::{DecodeError, EncodeError, MigrationError, RenderError};
#[doc(inline)]
pub use payload::{Encoded, Encoder, Payload, encode};
#[doc(inline)]
pub use view::{Element, View};

pub use islet_core::{ComponentKind, Region, registry, tree, wire};
/// Re-export of the `tracing` crate used for all diagnostics.
pub use tracing as log;

#[doc(hidden)]
pub use serde_json as __json;

pub mod prelude {
    //! The types and constructors needed to build and ship a payload.
    //!
    //! ```
    //! use islet::prelude::*;
    //!
    //! let card = vstack([text("Order #1042").into(), spacer().into(), View::from(progress(2.0, 4.0))]);
    //! let encoded = islet::encode(card).unwrap();
    //! assert!(!encoded.bytes().is_empty());
    //! ```
    pub use crate::component::{
        Component, ComponentKind, ElementType, LazyLoader, button, capsule, circle, class,
        component, divider, forward_ref, fragment, gradient, group, host, hstack, image, lazy,
        link, memo, primitive, progress, rectangle, rounded_rectangle, spacer, symbol, text,
        timer, toggle, vstack, zstack,
    };
    pub use crate::config::{Budget, DecoderConfig, EncoderConfig};
    pub use crate::context::Context;
    pub use crate::decode::{Decoded, Decoder, Regions};
    pub use crate::hooks::Hooks;
    pub use crate::payload::{Encoded, Encoder, Payload};
    pub use crate::style;
    pub use crate::view::{Element, Prop, Props, Style, View};
    pub use islet_core::Region;
}
