//! The author-side tree.
//!
//! A [`View`] is what authors build and hand to the encoder. Leaves are plain
//! values, containers are lists and elements. Elements live behind an [`Rc`],
//! and that pointer is their identity: cloning a `View` that holds an element
//! places the *same* node in a second position, which the encoder stores once.
//!
//! ```
//! use islet::prelude::*;
//!
//! let badge: View = text("Live").into();
//! let row = hstack([badge.clone(), spacer().into(), badge]);
//! # let _ = row;
//! ```

use core::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::component::ElementType;
use islet_core::registry::STYLE_PROPERTY;

/// Canonical name of the property holding an element's children.
pub const CHILDREN_PROPERTY: &str = "children";
/// Canonical name of the property lifted into an element's id.
pub const ID_PROPERTY: &str = "id";

/// A node of the author tree.
#[derive(Debug, Clone, Default)]
pub enum View {
    /// Renders nothing.
    #[default]
    Empty,
    /// A string leaf.
    Str(String),
    /// An integer leaf.
    Int(i64),
    /// A floating point leaf.
    Float(f64),
    /// A big integer leaf.
    BigInt(i128),
    /// A boolean leaf.
    Bool(bool),
    /// Siblings, flattened into their parent.
    List(Vec<View>),
    /// An element, identified by its allocation.
    Element(Rc<Element>),
}

impl View {
    /// Whether this view is [`View::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// A short description used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Empty => "empty".to_owned(),
            Self::Str(text) => format!("text {text:?}"),
            Self::Int(value) => format!("number {value}"),
            Self::Float(value) => format!("number {value}"),
            Self::BigInt(value) => format!("bigint {value}"),
            Self::Bool(value) => format!("boolean {value}"),
            Self::List(items) => format!("list of {}", items.len()),
            Self::Element(element) => format!("element {}", element.ty.name()),
        }
    }

    /// Converts a JSON scalar into a leaf. Objects and arrays have no view form.
    #[must_use]
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Empty),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::String(text) => Some(Self::Str(text.clone())),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<&str> for View {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for View {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

macro_rules! int_views {
    ($($ty:ty),*) => {
        $(impl From<$ty> for View {
            fn from(value: $ty) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

int_views!(i8, i16, i32, i64, u8, u16, u32);

impl From<i128> for View {
    fn from(value: i128) -> Self {
        Self::BigInt(value)
    }
}

impl From<f64> for View {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for View {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<bool> for View {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Element> for View {
    fn from(element: Element) -> Self {
        Self::Element(Rc::new(element))
    }
}

impl From<Rc<Element>> for View {
    fn from(element: Rc<Element>) -> Self {
        Self::Element(element)
    }
}

impl<V: Into<Self>> From<Option<V>> for View {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<V: Into<Self>> From<Vec<V>> for View {
    fn from(items: Vec<V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Self>, const N: usize> From<[V; N]> for View {
    fn from(items: [V; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Self>> FromIterator<V> for View {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

/// An element: a type plus its properties.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) ty: ElementType,
    pub(crate) props: Props,
}

impl Element {
    /// Creates an element with no properties.
    #[must_use]
    pub fn new(ty: ElementType) -> Self {
        Self {
            ty,
            props: Props::default(),
        }
    }

    /// The element type.
    #[must_use]
    pub const fn ty(&self) -> &ElementType {
        &self.ty
    }

    /// The element properties.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    /// Sets a property by canonical name.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Prop>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Sets the style. Use a [`Style::List`] to cascade several maps.
    #[must_use]
    pub fn style(mut self, style: impl Into<Style>) -> Self {
        self.props.insert(STYLE_PROPERTY, Prop::Style(style.into()));
        self
    }

    /// Sets the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.props.insert(ID_PROPERTY, Value::String(id.into()));
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn child(mut self, child: impl Into<View>) -> Self {
        let child = child.into();
        let children = match self.props.remove(CHILDREN_PROPERTY) {
            None => child,
            Some(existing) => match existing.into_view() {
                View::Empty => child,
                View::List(mut items) => {
                    items.push(child);
                    View::List(items)
                }
                other => View::List(vec![other, child]),
            },
        };
        self.props.insert(CHILDREN_PROPERTY, Prop::View(children));
        self
    }

    /// Replaces the children.
    #[must_use]
    pub fn children<V: Into<View>>(mut self, children: impl IntoIterator<Item = V>) -> Self {
        let children: View = children.into_iter().collect();
        self.props.insert(CHILDREN_PROPERTY, Prop::View(children));
        self
    }
}

/// Ordered element properties keyed by canonical name.
#[derive(Debug, Clone, Default)]
pub struct Props(IndexMap<String, Prop>);

impl Props {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a property.
    ///
    /// A JSON object or array stored under the style name becomes a [`Style`].
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Prop>) {
        let name = name.into();
        let value = match value.into() {
            Prop::Value(json @ (Value::Object(_) | Value::Array(_))) if name == STYLE_PROPERTY => {
                Prop::Style(Style::from_json(json))
            }
            other => other,
        };
        self.0.insert(name, value);
    }

    /// Removes a property, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Prop> {
        self.0.shift_remove(name)
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.0.get(name)
    }

    /// Looks up a string property.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Prop::Value(Value::String(text))) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Looks up a view property, cloning it.
    #[must_use]
    pub fn view(&self, name: &str) -> View {
        self.0.get(name).map_or(View::Empty, |prop| prop.clone().into_view())
    }

    /// The children, or [`View::Empty`].
    #[must_use]
    pub fn children(&self) -> View {
        self.view(CHILDREN_PROPERTY)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.0.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A property value.
#[derive(Debug, Clone)]
pub enum Prop {
    /// A JSON value. Only scalars survive rendering.
    Value(Value),
    /// A style description.
    Style(Style),
    /// A nested tree.
    View(View),
}

impl Prop {
    /// Views stay views and scalars become leaves; anything else is empty.
    #[must_use]
    pub fn into_view(self) -> View {
        match self {
            Self::View(view) => view,
            Self::Value(value) => View::from_scalar(&value).unwrap_or_default(),
            Self::Style(_) => View::Empty,
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

macro_rules! scalar_props {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Prop {
            fn from(value: $ty) -> Self {
                Self::Value(Value::from(value))
            }
        })*
    };
}

scalar_props!(i32, i64, u32, u64, f64, bool);

impl From<Style> for Prop {
    fn from(style: Style) -> Self {
        Self::Style(style)
    }
}

impl From<View> for Prop {
    fn from(view: View) -> Self {
        Self::View(view)
    }
}

impl From<Element> for Prop {
    fn from(element: Element) -> Self {
        Self::View(element.into())
    }
}

/// A style description before compression.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Style {
    /// No style.
    #[default]
    Empty,
    /// A map of canonical style keys.
    Map(Map<String, Value>),
    /// Maps applied left to right, later keys winning.
    List(Vec<Style>),
}

impl Style {
    /// Reads a style from JSON: objects are maps, arrays cascade, anything else is empty.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Map(map),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            _ => Self::Empty,
        }
    }
}

impl From<Map<String, Value>> for Style {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Self>> for Style {
    fn from(styles: Vec<Self>) -> Self {
        Self::List(styles)
    }
}

impl<const N: usize> From<[Self; N]> for Style {
    fn from(styles: [Self; N]) -> Self {
        Self::List(styles.into())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{spacer, text};
    use serde_json::json;

    #[test]
    fn cloning_keeps_identity() {
        let node: View = text("x").into();
        let copy = node.clone();
        let (View::Element(a), View::Element(b)) = (&node, &copy) else {
            panic!("expected elements");
        };
        assert!(Rc::ptr_eq(a, b));
    }

    #[test]
    fn child_appends_in_order() {
        let element = spacer().child("a").child(1).child(View::Empty);
        let View::List(children) = element.props().children() else {
            panic!("expected a list");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(&children[0], View::Str(text) if text == "a"));
        assert!(matches!(children[1], View::Int(1)));
    }

    #[test]
    fn style_json_becomes_style() {
        let element = spacer().prop("style", json!([{"width": 1}, {"width": 2}]));
        assert!(matches!(
            element.props().get("style"),
            Some(Prop::Style(Style::List(styles))) if styles.len() == 2
        ));
    }

    #[test]
    fn scalar_props_read_back_as_views() {
        let element = spacer().prop("children", "label");
        assert!(matches!(element.props().children(), View::Str(text) if text == "label"));
        assert!(View::from_scalar(&json!({})).is_none());
    }
}
