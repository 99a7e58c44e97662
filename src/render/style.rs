//! Style flattening, key compression and pooling.

use std::collections::HashMap;

use indexmap::IndexMap;
use islet_core::registry::{compress_name, is_reserved_name};
use islet_core::wire::{Node, PropValue, StyleMap, StyleValue};
use serde_json::Value;

use crate::view::Style;

/// Flattens a style cascade and shortens its keys.
///
/// Maps apply left to right and later keys win. A `null` value removes the
/// key set by an earlier map. Keys missing from the short-name table pass
/// through unchanged.
///
/// # Errors
///
/// Returns the first key that is itself a short wire name.
pub fn compress(style: &Style) -> Result<StyleMap, String> {
    let mut flat = IndexMap::new();
    flatten(style, &mut flat);
    flat.into_iter()
        .map(|(key, value)| {
            if is_reserved_name(&key) {
                return Err(key);
            }
            Ok((compress_name(&key).to_owned(), value))
        })
        .collect()
}

fn flatten(style: &Style, into: &mut IndexMap<String, Value>) {
    match style {
        Style::Empty => {}
        Style::Map(map) => {
            for (key, value) in map {
                if value.is_null() {
                    into.shift_remove(key);
                } else {
                    into.insert(key.clone(), value.clone());
                }
            }
        }
        Style::List(styles) => {
            for style in styles {
                flatten(style, into);
            }
        }
    }
}

#[derive(Debug)]
struct Interned {
    style: StyleMap,
    uses: usize,
}

/// Interns compressed styles during a render pass.
///
/// Every interned style is emitted as a provisional slot. [`StylePool::finish`]
/// moves the styles used at least twice into the shared pool, in order of
/// first use, and inlines the rest.
#[derive(Debug)]
pub struct StylePool {
    enabled: bool,
    lookup: HashMap<String, usize>,
    entries: Vec<Interned>,
}

impl StylePool {
    /// Creates a pool. A disabled pool inlines every style immediately.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lookup: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Records one use of `style`.
    pub fn intern(&mut self, style: StyleMap) -> StyleValue {
        if !self.enabled {
            return StyleValue::Inline(style);
        }
        let key = Value::Object(style.clone()).to_string();
        let slot = *self.lookup.entry(key).or_insert_with(|| {
            self.entries.push(Interned { style, uses: 0 });
            self.entries.len() - 1
        });
        self.entries[slot].uses += 1;
        StyleValue::Index(slot)
    }

    /// Resolves the provisional slots in `nodes` and returns the shared pool.
    pub fn finish<'a>(self, nodes: impl IntoIterator<Item = &'a mut Node>) -> Vec<StyleMap> {
        if !self.enabled {
            return Vec::new();
        }

        let mut targets = Vec::with_capacity(self.entries.len());
        let mut pool = Vec::new();
        for entry in &self.entries {
            if entry.uses > 1 {
                targets.push(Some(pool.len()));
                pool.push(entry.style.clone());
            } else {
                targets.push(None);
            }
        }

        let resolve = |slot: usize| match targets.get(slot).copied().flatten() {
            Some(index) => StyleValue::Index(index),
            None => StyleValue::Inline(
                self.entries
                    .get(slot)
                    .map(|entry| entry.style.clone())
                    .unwrap_or_default(),
            ),
        };
        for node in nodes {
            rewrite(node, &resolve);
        }

        tracing::trace!(interned = self.entries.len(), pooled = pool.len(), "resolved styles");
        pool
    }
}

fn rewrite(node: &mut Node, resolve: &impl Fn(usize) -> StyleValue) {
    match node {
        Node::Empty | Node::Text(_) | Node::Reference(_) => {}
        Node::Array(nodes) => {
            for node in nodes {
                rewrite(node, resolve);
            }
        }
        Node::Element(element) => {
            rewrite(&mut element.children, resolve);
            for value in element.props.values_mut() {
                match value {
                    PropValue::Style(style) => {
                        if let StyleValue::Index(slot) = *style {
                            *style = resolve(slot);
                        }
                    }
                    PropValue::Node(node) => rewrite(node, resolve),
                    PropValue::Scalar(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use islet_core::ComponentKind;
    use islet_core::wire::Element;
    use serde_json::json;

    fn style(value: Value) -> Style {
        Style::from_json(value)
    }

    fn compress_ok(style: &Style) -> StyleMap {
        compress(style).unwrap()
    }

    fn styled(value: StyleValue) -> Node {
        let mut element = Element::new(ComponentKind::Spacer);
        element.props.insert("s".into(), PropValue::Style(value));
        element.into()
    }

    #[test]
    fn cascade_is_left_to_right() {
        let compressed = compress_ok(&style(json!([
            {"padding": 4, "backgroundColor": "red", "opacity": 0.5},
            {"padding": 8, "opacity": null},
            {"someFutureKey": true}
        ])));
        assert_eq!(
            Value::Object(compressed),
            json!({"pd": 8, "bc": "red", "someFutureKey": true})
        );
    }

    #[test]
    fn short_keys_are_rejected() {
        assert_eq!(compress(&style(json!({"width": 1, "c": "red"}))), Err("c".to_owned()));
        assert!(compress(&style(json!([{"c": "red"}, {"c": null}]))).is_ok());
    }

    #[test]
    fn repeated_styles_share_a_slot() {
        let mut pool = StylePool::new(true);
        let first = pool.intern(compress_ok(&style(json!({"color": "red"}))));
        let second = pool.intern(compress_ok(&style(json!([{"color": "blue"}, {"color": "red"}]))));
        let other = pool.intern(compress_ok(&style(json!({"color": "blue"}))));
        assert_eq!(first, second);
        assert_ne!(first, other);

        let mut nodes = vec![styled(first), styled(second), styled(other)];
        let shared = pool.finish(nodes.iter_mut());
        assert_eq!(shared, vec![json!({"c": "red"}).as_object().cloned().unwrap()]);
        assert_eq!(nodes[0], styled(StyleValue::Index(0)));
        assert_eq!(nodes[1], styled(StyleValue::Index(0)));
        assert_eq!(
            nodes[2],
            styled(StyleValue::Inline(json!({"c": "blue"}).as_object().cloned().unwrap()))
        );
    }

    #[test]
    fn disabled_pool_inlines() {
        let mut pool = StylePool::new(false);
        let value = pool.intern(compress_ok(&style(json!({"width": 10}))));
        assert!(matches!(value, StyleValue::Inline(_)));
        assert!(pool.finish(Vec::new()).is_empty());
    }
}
