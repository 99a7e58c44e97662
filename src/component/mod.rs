//! Element types and the constructors authors build trees with.
//!
//! The vocabulary functions ([`text`], [`vstack`], [`image`], ...) produce
//! primitive elements, the only kind that reaches the wire. The wrapper
//! functions ([`fragment`], [`component`], [`memo`], [`lazy`], ...) produce
//! elements the renderer resolves away. [`host`], [`class`] and the built-in
//! wrappers exist so foreign trees can be described, and always fail to render.

mod function;

use core::fmt;
use std::any::Any;
use std::rc::Rc;

use serde_json::Value;

pub use function::{Component, LazyLoader};
pub use islet_core::ComponentKind;

use crate::context::ContextKey;
use crate::view::{Element, View};

/// What an element is.
#[derive(Clone)]
pub enum ElementType {
    /// Renders its children in place.
    Fragment,
    /// Makes a value visible to every descendant reading the same context.
    Provider {
        /// The context being provided.
        context: ContextKey,
        /// The value, type-checked by [`Context`](crate::context::Context).
        value: Rc<dyn Any>,
    },
    /// Renders the output of a closure fed with the nearest provided value.
    Consumer {
        /// The context being read.
        context: ContextKey,
        /// Builds the subtree from the value.
        render: Rc<dyn Fn(&dyn Any) -> View>,
    },
    /// A memoized wrapper, transparent in a single pass.
    Memo(Rc<ElementType>),
    /// A ref-forwarding wrapper, transparent in a single pass.
    ForwardRef(Component),
    /// A type resolved on first use.
    Lazy(LazyLoader),
    /// A function component.
    Function(Component),
    /// A component from the vocabulary.
    Primitive(ComponentKind),
    /// A platform-native primitive named by string. Rejected.
    Host(String),
    /// A class-style component. Rejected.
    Class(String),
    /// The strict-mode wrapper. Rejected.
    StrictMode,
    /// The profiling wrapper. Rejected.
    Profiler,
    /// The suspense boundary. Rejected.
    Suspense,
    /// A portal into another container. Rejected.
    Portal,
}

impl ElementType {
    /// A name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Fragment => "Fragment",
            Self::Provider { context, .. } => context.name(),
            Self::Consumer { context, .. } => context.name(),
            Self::Memo(inner) => inner.name(),
            Self::ForwardRef(component) | Self::Function(component) => component.name(),
            Self::Lazy(loader) => loader.name(),
            Self::Primitive(kind) => kind.name(),
            Self::Host(name) | Self::Class(name) => name,
            Self::StrictMode => "StrictMode",
            Self::Profiler => "Profiler",
            Self::Suspense => "Suspense",
            Self::Portal => "Portal",
        }
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragment => f.write_str("Fragment"),
            Self::Provider { context, .. } => f.debug_tuple("Provider").field(context).finish(),
            Self::Consumer { context, .. } => f.debug_tuple("Consumer").field(context).finish(),
            Self::Memo(inner) => f.debug_tuple("Memo").field(inner).finish(),
            Self::ForwardRef(component) => f.debug_tuple("ForwardRef").field(component).finish(),
            Self::Lazy(loader) => f.debug_tuple("Lazy").field(loader).finish(),
            Self::Function(component) => f.debug_tuple("Function").field(component).finish(),
            Self::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            Self::Host(name) => f.debug_tuple("Host").field(name).finish(),
            Self::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Self::StrictMode => f.write_str("StrictMode"),
            Self::Profiler => f.write_str("Profiler"),
            Self::Suspense => f.write_str("Suspense"),
            Self::Portal => f.write_str("Portal"),
        }
    }
}

impl From<ComponentKind> for ElementType {
    fn from(kind: ComponentKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Function(component)
    }
}

/// A bare primitive element.
#[must_use]
pub fn primitive(kind: ComponentKind) -> Element {
    Element::new(ElementType::Primitive(kind))
}

fn container<V: Into<View>>(kind: ComponentKind, children: impl IntoIterator<Item = V>) -> Element {
    primitive(kind).children(children)
}

/// A run of text. Children must resolve to strings.
#[must_use]
pub fn text(content: impl Into<View>) -> Element {
    primitive(ComponentKind::Text).child(content)
}

/// Stacks children vertically.
#[must_use]
pub fn vstack<V: Into<View>>(children: impl IntoIterator<Item = V>) -> Element {
    container(ComponentKind::VStack, children)
}

/// Stacks children horizontally.
#[must_use]
pub fn hstack<V: Into<View>>(children: impl IntoIterator<Item = V>) -> Element {
    container(ComponentKind::HStack, children)
}

/// Overlays children back to front.
#[must_use]
pub fn zstack<V: Into<View>>(children: impl IntoIterator<Item = V>) -> Element {
    container(ComponentKind::ZStack, children)
}

/// Groups children without layout.
#[must_use]
pub fn group<V: Into<View>>(children: impl IntoIterator<Item = V>) -> Element {
    container(ComponentKind::Group, children)
}

/// An image from a named asset or a data URI.
#[must_use]
pub fn image(source: impl Into<String>) -> Element {
    primitive(ComponentKind::Image).prop("source", source.into())
}

/// A platform symbol.
#[must_use]
pub fn symbol(system_name: impl Into<String>) -> Element {
    primitive(ComponentKind::Symbol).prop("systemName", system_name.into())
}

/// Flexible space.
#[must_use]
pub fn spacer() -> Element {
    primitive(ComponentKind::Spacer)
}

/// A separator line.
#[must_use]
pub fn divider() -> Element {
    primitive(ComponentKind::Divider)
}

/// A control that opens a deep link when tapped.
#[must_use]
pub fn button(label: impl Into<View>, deep_link: impl Into<String>) -> Element {
    primitive(ComponentKind::Button)
        .prop("deepLink", deep_link.into())
        .child(label)
}

/// Content that opens a URL.
#[must_use]
pub fn link(url: impl Into<String>, content: impl Into<View>) -> Element {
    primitive(ComponentKind::Link).prop("url", url.into()).child(content)
}

/// A two-state switch.
#[must_use]
pub fn toggle(is_on: bool, label: impl Into<View>) -> Element {
    primitive(ComponentKind::Toggle).prop("isOn", is_on).child(label)
}

/// A determinate progress bar.
#[must_use]
pub fn progress(value: f64, total: f64) -> Element {
    primitive(ComponentKind::Progress)
        .prop("value", value)
        .prop("total", total)
}

/// A clock counting toward or away from `ends_at`, in seconds since the epoch.
#[must_use]
pub fn timer(ends_at: impl Into<Value>, counts_down: bool) -> Element {
    primitive(ComponentKind::Timer)
        .prop("endsAt", ends_at.into())
        .prop("countsDown", counts_down)
}

/// A linear gradient between two colors.
#[must_use]
pub fn gradient(start_color: impl Into<String>, end_color: impl Into<String>) -> Element {
    primitive(ComponentKind::Gradient)
        .prop("startColor", start_color.into())
        .prop("endColor", end_color.into())
}

/// A circle.
#[must_use]
pub fn circle() -> Element {
    primitive(ComponentKind::Circle)
}

/// A rectangle.
#[must_use]
pub fn rectangle() -> Element {
    primitive(ComponentKind::Rectangle)
}

/// A rectangle with rounded corners.
#[must_use]
pub fn rounded_rectangle(corner_radius: f64) -> Element {
    primitive(ComponentKind::RoundedRectangle).prop("cornerRadius", corner_radius)
}

/// A pill.
#[must_use]
pub fn capsule() -> Element {
    primitive(ComponentKind::Capsule)
}

/// Renders `children` in place.
#[must_use]
pub fn fragment<V: Into<View>>(children: impl IntoIterator<Item = V>) -> Element {
    Element::new(ElementType::Fragment).children(children)
}

/// Uses a function component.
#[must_use]
pub fn component(component: &Component) -> Element {
    Element::new(ElementType::Function(component.clone()))
}

/// Uses a function component through a memo wrapper.
#[must_use]
pub fn memo(component: &Component) -> Element {
    Element::new(ElementType::Memo(Rc::new(ElementType::Function(
        component.clone(),
    ))))
}

/// Uses a function component through a ref-forwarding wrapper.
#[must_use]
pub fn forward_ref(component: &Component) -> Element {
    Element::new(ElementType::ForwardRef(component.clone()))
}

/// Uses a lazily loaded type.
#[must_use]
pub fn lazy(loader: LazyLoader) -> Element {
    Element::new(ElementType::Lazy(loader))
}

/// A platform-native primitive. Always fails to render.
#[must_use]
pub fn host(name: impl Into<String>) -> Element {
    Element::new(ElementType::Host(name.into()))
}

/// A class-style component. Always fails to render.
#[must_use]
pub fn class(name: impl Into<String>) -> Element {
    Element::new(ElementType::Class(name.into()))
}
