//! Canonical trees produced by decoding.
//!
//! A decoded tree has no references, no pool indices and no short names. It is
//! the form a native surface walks to build its widgets.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::ComponentKind;

/// A style map keyed by canonical property names.
pub type StyleMap = Map<String, Value>;

/// A resolved node.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Renders nothing.
    #[default]
    Empty,
    /// A string, found as the children of a text element.
    Text(String),
    /// Ordered siblings.
    Array(Vec<Node>),
    /// A component.
    Element(Box<Element>),
}

impl Node {
    /// Shorthand for a [`Node::Text`].
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether this node renders nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Counts the elements in this tree.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self {
            Self::Empty | Self::Text(_) => 0,
            Self::Array(nodes) => nodes.iter().map(Self::element_count).sum(),
            Self::Element(element) => {
                1 + element.children.element_count()
                    + element
                        .props
                        .values()
                        .map(|prop| match prop {
                            Prop::Node(node) => node.element_count(),
                            Prop::Value(_) | Prop::Style(_) => 0,
                        })
                        .sum::<usize>()
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(Box::new(element))
    }
}

/// A resolved element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Component kind, written by name.
    #[serde(rename = "type", serialize_with = "kind_name")]
    pub kind: ComponentKind,
    /// Author-supplied id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Children.
    #[serde(skip_serializing_if = "Node::is_empty")]
    pub children: Node,
    /// Properties keyed by canonical name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, Prop>,
}

impl Element {
    /// Creates an element with nothing attached.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            id: None,
            children: Node::Empty,
            props: IndexMap::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the children.
    #[must_use]
    pub fn with_children(mut self, children: impl Into<Node>) -> Self {
        self.children = children.into();
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_prop(mut self, name: impl Into<String>, prop: Prop) -> Self {
        self.props.insert(name.into(), prop);
        self
    }

    /// Returns the canonical style map, if any.
    #[must_use]
    pub fn style(&self) -> Option<&StyleMap> {
        match self.props.get(crate::registry::STYLE_PROPERTY) {
            Some(Prop::Style(style)) => Some(style),
            _ => None,
        }
    }
}

/// A resolved property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prop {
    /// A JSON scalar.
    Value(Value),
    /// A style map with canonical keys.
    Style(StyleMap),
    /// A nested tree.
    Node(Node),
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<Self>> for Node {
    fn from(nodes: Vec<Self>) -> Self {
        Self::Array(nodes)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn kind_name<S: Serializer>(kind: &ComponentKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.name())
}
