//! Identity-based sharing of reused elements.
//!
//! Before rendering, one scan over every region finds the element
//! allocations that are reachable more than once. While rendering, the first
//! visit to such an element renders it, appends the result to the shared
//! element pool and answers with a reference. Later visits answer with the
//! same reference without rendering again. Equal but separately built
//! elements are never merged.
//!
//! Only single elements are pooled. A shared fragment or component that
//! renders a list is rendered once and its siblings are repeated inline, so
//! they still splice into the enclosing list.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use islet_core::wire::{Node, PropValue};

use crate::view::{Element, Prop, View};

type Identity = *const Element;

fn identity(element: &Rc<Element>) -> Identity {
    Rc::as_ptr(element)
}

#[derive(Debug, Clone)]
enum Slot {
    Pooled(usize),
    Inline { node: Node, height: usize },
}

/// Tracks shared elements and the pool they are written to.
#[derive(Debug, Default)]
pub struct SharedElements {
    shared: HashSet<Identity>,
    slots: HashMap<Identity, Slot>,
    pool: Vec<Node>,
    heights: Vec<usize>,
}

impl SharedElements {
    /// Scans `roots` for element allocations reachable more than once.
    ///
    /// The scan follows lists, element properties and children. It does not
    /// run components, so sharing that only appears in component output is
    /// not detected.
    pub fn scan<'a>(roots: impl IntoIterator<Item = &'a View>) -> Self {
        let mut seen = HashSet::new();
        let mut shared = HashSet::new();
        let mut stack: Vec<&View> = roots.into_iter().collect();

        while let Some(view) = stack.pop() {
            match view {
                View::List(items) => stack.extend(items),
                View::Element(element) => {
                    if !seen.insert(identity(element)) {
                        shared.insert(identity(element));
                        continue;
                    }
                    stack.extend(element.props().iter().filter_map(|(_, prop)| match prop {
                        Prop::View(view) => Some(view),
                        Prop::Value(_) | Prop::Style(_) => None,
                    }));
                }
                _ => {}
            }
        }

        tracing::trace!(shared = shared.len(), scanned = seen.len(), "scanned for shared elements");
        Self {
            shared,
            ..Self::default()
        }
    }

    /// Whether `element` was found more than once.
    pub fn is_shared(&self, element: &Rc<Element>) -> bool {
        self.shared.contains(&identity(element))
    }

    /// The node standing in for an element that was already rendered,
    /// with the element depth it adds once resolved.
    pub fn lookup(&self, element: &Rc<Element>) -> Option<(Node, usize)> {
        self.slots.get(&identity(element)).map(|slot| match slot {
            Slot::Pooled(index) => (Node::reference(*index), self.heights[*index]),
            Slot::Inline { node, height } => (node.clone(), *height),
        })
    }

    /// Records the rendered form of a shared element and returns its stand-in.
    ///
    /// An element is pooled and answered with a reference. Anything else is
    /// remembered and answered with itself.
    pub fn insert(&mut self, element: &Rc<Element>, node: Node) -> Node {
        let height = height(&node, &self.heights);
        if !matches!(node, Node::Element(_)) {
            self.slots.insert(
                identity(element),
                Slot::Inline {
                    node: node.clone(),
                    height,
                },
            );
            return node;
        }
        let index = self.pool.len();
        self.pool.push(node);
        self.heights.push(height);
        self.slots.insert(identity(element), Slot::Pooled(index));
        Node::reference(index)
    }

    /// Number of pooled elements.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// The pool, in index order.
    pub fn into_pool(self) -> Vec<Node> {
        self.pool
    }
}

/// Element depth of `node` once its references are resolved.
fn height(node: &Node, pooled: &[usize]) -> usize {
    match node {
        Node::Empty | Node::Text(_) => 0,
        Node::Reference(reference) => pooled.get(reference.index).copied().unwrap_or(0),
        Node::Array(nodes) => nodes.iter().map(|node| height(node, pooled)).max().unwrap_or(0),
        Node::Element(element) => {
            let props = element.props.values().map(|value| match value {
                PropValue::Node(node) => height(node, pooled),
                PropValue::Scalar(_) | PropValue::Style(_) => 0,
            });
            1 + props.fold(height(&element.children, pooled), usize::max)
        }
    }
}
