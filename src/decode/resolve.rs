//! Reference and style resolution for one current-version envelope.
//!
//! Everything here degrades per node: a bad reference, an unknown component
//! or an over-deep tree turns into [`Node::Empty`] at that position and the
//! rest of the envelope decodes normally.

use islet_core::ComponentKind;
use islet_core::Region;
use islet_core::registry::{STYLE_PROPERTY, expand_name};
use islet_core::tree::{Element, Node, Prop, StyleMap};
use islet_core::wire::{
    CHILDREN_KEY, ID_KEY, KIND_KEY, MAX_ELEMENT_DEPTH, PROPS_KEY, REFERENCE_KEY,
    SHARED_ELEMENTS_KEY, SHARED_STYLES_KEY, VERSION_KEY,
};
use serde_json::{Map, Value};

use super::Regions;

/// Deepest raw JSON nesting walked, counting arrays and reference hops.
const MAX_NESTING: usize = MAX_ELEMENT_DEPTH * 4;

/// Resolves every region of a migrated envelope.
pub fn extract(envelope: &Map<String, Value>) -> Regions {
    let elements = envelope
        .get(SHARED_ELEMENTS_KEY)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let styles = envelope
        .get(SHARED_STYLES_KEY)
        .and_then(Value::as_array)
        .map(|styles| styles.iter().map(expand_style_entry).collect())
        .unwrap_or_default();

    let mut resolver = Resolver::new(elements, styles);
    let mut regions = Regions::default();
    for (key, value) in envelope {
        if matches!(key.as_str(), VERSION_KEY | SHARED_ELEMENTS_KEY | SHARED_STYLES_KEY) {
            continue;
        }
        let Some(region) = Region::ALL.into_iter().find(|region| region.key() == key) else {
            tracing::debug!(%key, "ignoring unknown envelope key");
            continue;
        };
        let node = resolver.node(value);
        if !node.is_empty() {
            regions.insert(region, node);
        }
    }
    regions
}

fn expand_style_entry(entry: &Value) -> StyleMap {
    match entry {
        Value::Object(style) => expand_style(style),
        other => {
            tracing::warn!(entry = %other, "shared style is not an object");
            StyleMap::new()
        }
    }
}

fn expand_style(style: &Map<String, Value>) -> StyleMap {
    style
        .iter()
        .map(|(key, value)| (expand_name(key).to_owned(), value.clone()))
        .collect()
}

/// Walks wire nodes into canonical trees.
struct Resolver<'a> {
    elements: &'a [Value],
    styles: Vec<StyleMap>,
    resolved: Vec<Option<Node>>,
    active: Vec<usize>,
    depth: usize,
    nesting: usize,
    truncated: bool,
}

impl<'a> Resolver<'a> {
    fn new(elements: &'a [Value], styles: Vec<StyleMap>) -> Self {
        Self {
            elements,
            styles,
            resolved: vec![None; elements.len()],
            active: Vec::new(),
            depth: 0,
            nesting: 0,
            truncated: false,
        }
    }

    fn node(&mut self, value: &Value) -> Node {
        if self.nesting >= MAX_NESTING {
            tracing::warn!(max = MAX_NESTING, "nesting too deep; dropping subtree");
            self.truncated = true;
            return Node::Empty;
        }
        self.nesting += 1;
        let node = self.node_at_depth(value);
        self.nesting -= 1;
        node
    }

    fn node_at_depth(&mut self, value: &Value) -> Node {
        match value {
            Value::Null => Node::Empty,
            Value::String(text) => Node::Text(text.clone()),
            Value::Array(items) => Node::Array(items.iter().map(|item| self.node(item)).collect()),
            Value::Object(map) => match map.get(REFERENCE_KEY) {
                Some(index) => self.reference(index),
                None => self.element(map),
            },
            Value::Bool(_) | Value::Number(_) => {
                tracing::warn!(%value, "scalar in node position; dropping");
                Node::Empty
            }
        }
    }

    /// Resolves a pool reference, memoizing each entry.
    ///
    /// Inside a pool entry only earlier entries may be referenced, which rules
    /// out cycles. An entry cut short by the depth limit is not memoized.
    fn reference(&mut self, index: &Value) -> Node {
        let pool = self.elements.len();
        let Some(index) = index
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < pool)
        else {
            tracing::warn!(%index, pool, "reference out of range");
            return Node::Empty;
        };
        if let Some(&current) = self.active.last()
            && index >= current
        {
            tracing::warn!(index, current, "forward reference inside shared element");
            return Node::Empty;
        }
        if let Some(node) = &self.resolved[index] {
            return node.clone();
        }

        let elements = self.elements;
        let outer = std::mem::take(&mut self.truncated);
        self.active.push(index);
        let node = self.node(&elements[index]);
        self.active.pop();
        if !self.truncated {
            self.resolved[index] = Some(node.clone());
        }
        self.truncated |= outer;
        node
    }

    fn element(&mut self, map: &Map<String, Value>) -> Node {
        if self.depth >= MAX_ELEMENT_DEPTH {
            tracing::warn!(max = MAX_ELEMENT_DEPTH, "tree too deep; dropping subtree");
            self.truncated = true;
            return Node::Empty;
        }
        self.depth += 1;
        let node = self.element_fields(map);
        self.depth -= 1;
        node
    }

    fn element_fields(&mut self, map: &Map<String, Value>) -> Node {
        let Some(kind) = map
            .get(KIND_KEY)
            .and_then(Value::as_u64)
            .and_then(|id| u16::try_from(id).ok())
            .and_then(ComponentKind::from_id)
        else {
            tracing::warn!(kind = ?map.get(KIND_KEY), "unknown component; dropping node");
            return Node::Empty;
        };

        let mut element = Element::new(kind);
        element.id = match map.get(ID_KEY) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        if let Some(children) = map.get(CHILDREN_KEY) {
            element.children = self.node(children);
        }
        if let Some(Value::Object(props)) = map.get(PROPS_KEY) {
            for (key, value) in props {
                let name = expand_name(key);
                if let Some(prop) = self.prop(name, value) {
                    element.props.insert(name.to_owned(), prop);
                }
            }
        }
        element.into()
    }

    fn prop(&mut self, name: &str, value: &Value) -> Option<Prop> {
        match value {
            Value::Number(index) if name == STYLE_PROPERTY => {
                let style = index
                    .as_u64()
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|index| self.styles.get(index));
                if style.is_none() {
                    tracing::warn!(%index, pool = self.styles.len(), "style index out of range");
                }
                style.cloned().map(Prop::Style)
            }
            Value::Object(map) if !map.contains_key(KIND_KEY) && !map.contains_key(REFERENCE_KEY) => {
                Some(Prop::Style(expand_style(map)))
            }
            Value::Object(_) | Value::Array(_) => {
                let node = self.node(value);
                (!node.is_empty()).then_some(Prop::Node(node))
            }
            _ => Some(Prop::Value(value.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn regions(envelope: Value) -> Regions {
        extract(envelope.as_object().unwrap())
    }

    fn text(content: &str) -> Node {
        Element::new(ComponentKind::Text).with_children(content).into()
    }

    #[test]
    fn references_resolve_to_pool_entries() {
        let regions = regions(json!({
            "v": 2,
            "p": [{"$r": 0}, {"$r": 0}],
            "e": [{"t": 0, "c": "x"}]
        }));
        assert_eq!(
            regions.get(Region::Primary),
            Some(&Node::Array(vec![text("x"), text("x")]))
        );
    }

    #[test]
    fn bad_references_only_drop_their_position() {
        let regions = regions(json!({
            "v": 2,
            "p": {"t": 1, "c": [{"$r": 7}, {"$r": -1}, {"$r": "0"}, {"t": 0, "c": "kept"}]},
            "e": [{"t": 6}]
        }));
        let expected: Node = Element::new(ComponentKind::VStack)
            .with_children(vec![Node::Empty, Node::Empty, Node::Empty, text("kept")])
            .into();
        assert_eq!(regions.get(Region::Primary), Some(&expected));
    }

    #[test]
    fn pool_entries_cannot_point_forward_or_at_themselves() {
        let regions = regions(json!({
            "v": 2,
            "p": [{"$r": 0}, {"$r": 1}],
            "e": [[{"$r": 0}, {"$r": 1}], [{"$r": 0}, {"t": 7}]]
        }));
        let divider: Node = Element::new(ComponentKind::Divider).into();
        let first = Node::Array(vec![Node::Empty, Node::Empty]);
        assert_eq!(
            regions.get(Region::Primary),
            Some(&Node::Array(vec![
                first.clone(),
                Node::Array(vec![first, divider])
            ]))
        );
    }

    #[test]
    fn depth_is_bounded() {
        let mut value = json!({"t": 6});
        for _ in 0..MAX_ELEMENT_DEPTH + 4 {
            value = json!({"t": 18, "c": value});
        }
        let regions = regions(json!({"v": 2, "p": value}));
        let mut node = regions.get(Region::Primary).unwrap();
        let mut depth = 0;
        while let Some(element) = node.as_element() {
            node = &element.children;
            depth += 1;
        }
        assert_eq!(depth, MAX_ELEMENT_DEPTH);
    }

    #[test]
    fn arrays_and_references_add_no_depth() {
        let mut value = json!({"$r": 0});
        for _ in 0..MAX_ELEMENT_DEPTH - 2 {
            value = json!({"t": 1, "c": [value]});
        }
        let regions = regions(json!({"v": 2, "p": value, "e": [{"t": 18, "c": [{"t": 6}]}]}));
        let mut node = regions.get(Region::Primary).unwrap();
        let mut depth = 0;
        while let Some(element) = node.as_element() {
            node = match &element.children {
                Node::Array(children) => &children[0],
                other => other,
            };
            depth += 1;
        }
        assert_eq!(depth, MAX_ELEMENT_DEPTH);
    }

    #[test]
    fn entries_cut_short_are_not_memoized() {
        let mut deep = json!({"$r": 0});
        for _ in 0..MAX_ELEMENT_DEPTH - 1 {
            deep = json!({"t": 18, "c": deep});
        }
        let regions = regions(json!({
            "v": 2,
            "p": [deep, {"$r": 0}],
            "e": [{"t": 18, "c": {"t": 6}}]
        }));
        let Some(Node::Array(items)) = regions.get(Region::Primary) else {
            panic!("expected two siblings");
        };
        let whole: Node = Element::new(ComponentKind::Group)
            .with_children(Node::from(Element::new(ComponentKind::Spacer)))
            .into();
        assert_eq!(items[1], whole);
    }

    #[test]
    fn props_expand_to_canonical_form() {
        let regions = regions(json!({
            "v": 2,
            "p": {"t": 4, "i": 7, "p": {
                "s": 0,
                "src": "logo",
                "mk": {"t": 14},
                "bg": {"bc": "red"},
                "ol": {"$r": 9},
                "zz": 1
            }},
            "s": [{"w": 10, "unknownKey": 1}]
        }));
        let expected: Node = Element::new(ComponentKind::Image)
            .with_id("7")
            .with_prop("style", Prop::Style(json!({"width": 10, "unknownKey": 1}).as_object().cloned().unwrap()))
            .with_prop("source", Prop::Value(json!("logo")))
            .with_prop("mask", Prop::Node(Element::new(ComponentKind::Circle).into()))
            .with_prop("background", Prop::Style(json!({"backgroundColor": "red"}).as_object().cloned().unwrap()))
            .with_prop("zz", Prop::Value(json!(1)))
            .into();
        assert_eq!(regions.get(Region::Primary), Some(&expected));
    }

    #[test]
    fn unknown_kinds_and_keys_are_dropped() {
        let regions = regions(json!({
            "v": 2,
            "p": {"t": 999},
            "mi": {"t": 5, "s": 2},
            "future": {"t": 6}
        }));
        assert_eq!(regions.get(Region::Primary), None);
        assert_eq!(
            regions.get(Region::Minimal),
            Some(&Node::from(Element::new(ComponentKind::Symbol)))
        );
        assert_eq!(regions.len(), 1);
    }
}
