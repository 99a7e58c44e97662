//! The envelope as it travels between producer and consumer.
//!
//! Everything in this module is shaped for size: keys are one or two letters,
//! components are numeric ids and empty containers are never written. The
//! types only serialize; consumers read the envelope back as a
//! [`serde_json::Value`] because it may come from a different schema revision.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ComponentKind, Region};

/// The schema version written by this producer and fully understood by this consumer.
pub const CURRENT_VERSION: u32 = 2;

/// Deepest element nesting a producer may write and a consumer resolves.
///
/// Only elements count. Sibling arrays and pool references add no depth.
pub const MAX_ELEMENT_DEPTH: usize = 64;

/// Envelope key holding the schema version.
pub const VERSION_KEY: &str = "v";
/// Envelope key holding the shared element pool.
pub const SHARED_ELEMENTS_KEY: &str = "e";
/// Envelope key holding the shared style pool.
pub const SHARED_STYLES_KEY: &str = "s";
/// Object key marking a reference into the shared element pool.
pub const REFERENCE_KEY: &str = "$r";
/// Element key holding the component id.
pub const KIND_KEY: &str = "t";
/// Element key holding the author-supplied id.
pub const ID_KEY: &str = "i";
/// Element key holding the children node.
pub const CHILDREN_KEY: &str = "c";
/// Element key holding the property map.
pub const PROPS_KEY: &str = "p";

/// A style map with short keys, as written on the wire.
pub type StyleMap = Map<String, Value>;

/// A serialized node.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Renders nothing. Written as `null`.
    #[default]
    Empty,
    /// Resolved children of a text-rendering element.
    Text(String),
    /// Ordered siblings.
    Array(Vec<Node>),
    /// Points into the shared element pool.
    Reference(Reference),
    /// A component from the vocabulary.
    Element(Box<Element>),
}

impl Node {
    /// Returns a reference to pool slot `index`.
    #[must_use]
    pub const fn reference(index: usize) -> Self {
        Self::Reference(Reference { index })
    }

    /// Whether this node renders nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(Box::new(element))
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A `{"$r": index}` pointer into the shared element pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Pool slot.
    #[serde(rename = "$r")]
    pub index: usize,
}

/// A compact element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Component id.
    #[serde(rename = "t")]
    pub kind: ComponentKind,
    /// Author-supplied id, lifted out of the property map.
    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Children, omitted when empty.
    #[serde(rename = "c", skip_serializing_if = "Node::is_empty")]
    pub children: Node,
    /// Properties keyed by short name, omitted when empty.
    #[serde(rename = "p", skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, PropValue>,
}

impl Element {
    /// Creates an element with no id, children or properties.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            id: None,
            children: Node::Empty,
            props: IndexMap::new(),
        }
    }
}

/// A property value on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    /// A JSON scalar.
    Scalar(Value),
    /// A compressed style.
    Style(StyleValue),
    /// A nested node passed as a property.
    Node(Node),
}

/// A compressed style, either inline or pooled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Index into the shared style pool.
    Index(usize),
    /// Short-keyed map embedded in place.
    Inline(StyleMap),
}

/// The complete document for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Schema version.
    #[serde(rename = "v")]
    pub version: u32,
    /// One tree per populated region, in insertion order.
    #[serde(flatten)]
    pub regions: IndexMap<Region, Node>,
    /// Nodes reused by identity, referenced by index.
    #[serde(rename = "e", skip_serializing_if = "Vec::is_empty")]
    pub shared_elements: Vec<Node>,
    /// Styles used more than once, referenced by index.
    #[serde(rename = "s", skip_serializing_if = "Vec::is_empty")]
    pub shared_styles: Vec<StyleMap>,
}

impl Envelope {
    /// Creates an empty envelope at [`CURRENT_VERSION`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            regions: IndexMap::new(),
            shared_elements: Vec::new(),
            shared_styles: Vec::new(),
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_containers_are_not_written() {
        let node = Node::from(Element::new(ComponentKind::Spacer));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"t": 6}));
    }

    #[test]
    fn element_shape() {
        let mut element = Element::new(ComponentKind::Text);
        element.id = Some("title".into());
        element.children = Node::Text("Hi".into());
        element.props.insert(
            "s".into(),
            PropValue::Style(StyleValue::Index(0)),
        );
        element
            .props
            .insert("nl".into(), PropValue::Scalar(json!(1)));
        assert_eq!(
            serde_json::to_value(Node::from(element)).unwrap(),
            json!({"t": 0, "i": "title", "c": "Hi", "p": {"s": 0, "nl": 1}})
        );
    }

    #[test]
    fn envelope_shape() {
        let mut envelope = Envelope::new();
        envelope.regions.insert(
            Region::Primary,
            Node::Array(vec![Node::reference(0), Node::reference(0)]),
        );
        envelope.shared_elements.push(Node::Text("x".into()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"v": 2, "p": [{"$r": 0}, {"$r": 0}], "e": ["x"]})
        );
    }
}
