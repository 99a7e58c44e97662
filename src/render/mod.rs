//! The single-pass tree renderer.
//!
//! [`Renderer`] turns author [`View`]s into wire [`Node`]s. It resolves every
//! wrapper and function component down to primitives, keeps the provider stack
//! for context reads, flattens lists, collapses text children into strings and
//! compresses properties. Element reuse and repeated styles are handed to
//! [`SharedElements`] and [`StylePool`].

mod dedup;
pub mod style;

use std::rc::Rc;
use std::task::Poll;

use indexmap::IndexMap;
use islet_core::registry::{STYLE_PROPERTY, compress_name, is_reserved_name};
use islet_core::wire::{self, MAX_ELEMENT_DEPTH, Node, PropValue, StyleMap, StyleValue};
use islet_core::{ComponentKind, Region};
use serde_json::Value;

pub use dedup::SharedElements;
pub use style::StylePool;

use crate::component::{Component, ElementType};
use crate::config::EncoderConfig;
use crate::context::ContextStack;
use crate::error::RenderError;
use crate::hooks::{Hooks, SinglePassDispatcher};
use crate::view::{CHILDREN_PROPERTY, Element, ID_PROPERTY, Prop, Props, View};

type Result<T, E = RenderError> = core::result::Result<T, E>;

/// What an element resolves to once its wrappers are peeled off.
enum Resolved<'a> {
    Primitive(ComponentKind, &'a Props),
    View(View),
}

/// Renders views for one envelope.
///
/// A renderer carries the per-envelope state: the provider stack, the id
/// counter behind `use_id`, the shared element pool and the style pool. Create
/// one per encoding pass and render every region through it.
#[derive(Debug)]
pub struct Renderer {
    contexts: ContextStack,
    ids: usize,
    scope: Vec<String>,
    depth: usize,
    dedupe: bool,
    shared: SharedElements,
    styles: StylePool,
}

impl Renderer {
    /// Creates a renderer for `roots`, scanning them for shared elements.
    pub fn new<'a>(config: &EncoderConfig, roots: impl IntoIterator<Item = &'a View>) -> Self {
        let shared = if config.dedupe {
            SharedElements::scan(roots)
        } else {
            SharedElements::default()
        };
        Self {
            contexts: ContextStack::new(),
            ids: 0,
            scope: Vec::new(),
            depth: 0,
            dedupe: config.dedupe,
            shared,
            styles: StylePool::new(config.pool_styles),
        }
    }

    /// Renders one root.
    ///
    /// # Errors
    ///
    /// Fails on the first construct that cannot be serialized.
    pub fn render(&mut self, view: &View) -> Result<Node> {
        self.scope.clear();
        self.depth = 0;
        self.render_view(view)
    }

    /// Number of elements pooled so far.
    #[must_use]
    pub fn shared_len(&self) -> usize {
        self.shared.len()
    }

    /// Completes the pass: resolves style slots in `regions` and the element
    /// pool, then returns both pools.
    #[must_use]
    pub fn finish(self, regions: &mut IndexMap<Region, Node>) -> (Vec<Node>, Vec<StyleMap>) {
        let mut elements = self.shared.into_pool();
        let styles = self
            .styles
            .finish(regions.values_mut().chain(elements.iter_mut()));
        (elements, styles)
    }

    fn parent(&self) -> String {
        self.scope.last().cloned().unwrap_or_else(|| "the root".to_owned())
    }

    fn scoped<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.scope.push(name.to_owned());
        let result = f(self);
        self.scope.pop();
        result
    }

    fn render_view(&mut self, view: &View) -> Result<Node> {
        match view {
            View::Empty => Ok(Node::Empty),
            View::Str(_) | View::Int(_) | View::Float(_) | View::BigInt(_) | View::Bool(_) => {
                Err(RenderError::TypeKind {
                    value: view.describe(),
                    parent: self.parent(),
                })
            }
            View::List(items) => self.render_list(items),
            View::Element(element) => {
                if !(self.dedupe && self.shared.is_shared(element)) {
                    return self.render_element(element);
                }
                if let Some((node, height)) = self.shared.lookup(element) {
                    if self.depth + height > MAX_ELEMENT_DEPTH {
                        return Err(RenderError::TooDeep {
                            component: self.parent(),
                            max: MAX_ELEMENT_DEPTH,
                        });
                    }
                    return Ok(node);
                }
                let node = self.render_element(element)?;
                Ok(self.shared.insert(element, node))
            }
        }
    }

    fn render_list(&mut self, items: &[View]) -> Result<Node> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match self.render_view(item)? {
                Node::Empty => {}
                Node::Array(inner) => nodes.extend(inner),
                node => nodes.push(node),
            }
        }
        Ok(if nodes.is_empty() {
            Node::Empty
        } else {
            Node::Array(nodes)
        })
    }

    fn render_element(&mut self, element: &Rc<Element>) -> Result<Node> {
        self.resolve(&element.ty, &element.props, &mut |this, resolved| match resolved {
            Resolved::Primitive(kind, props) => this.render_primitive(kind, props),
            Resolved::View(view) => this.render_view(&view),
        })
    }

    /// Peels wrappers off `ty` and hands the result to `visit`.
    ///
    /// Providers stay pushed for exactly the duration of the visit.
    fn resolve<R>(
        &mut self,
        ty: &ElementType,
        props: &Props,
        visit: &mut dyn FnMut(&mut Self, Resolved<'_>) -> Result<R>,
    ) -> Result<R> {
        match ty {
            ElementType::Primitive(kind) => visit(self, Resolved::Primitive(*kind, props)),
            ElementType::Fragment => visit(self, Resolved::View(props.children())),
            ElementType::Provider { context, value } => {
                self.contexts.push(context, Rc::clone(value));
                let result = visit(self, Resolved::View(props.children()));
                self.contexts.pop(context);
                result
            }
            ElementType::Consumer { context, render } => {
                let value = self.contexts.read(context);
                let view = render(&*value);
                visit(self, Resolved::View(view))
            }
            ElementType::Memo(inner) => self.resolve(inner, props, visit),
            ElementType::ForwardRef(component) | ElementType::Function(component) => {
                let view = self.invoke(component, props)?;
                self.scoped(component.name(), |this| visit(this, Resolved::View(view)))
            }
            ElementType::Lazy(loader) => match loader.load() {
                Poll::Ready(ty) => self.resolve(&ty, props, visit),
                Poll::Pending => Err(RenderError::Suspended(loader.name().to_owned())),
            },
            ElementType::Host(name) => Err(RenderError::HostComponent(name.clone())),
            ElementType::Class(name) => Err(RenderError::ClassComponent(name.clone())),
            ElementType::StrictMode => Err(RenderError::UnsupportedWrapper("StrictMode")),
            ElementType::Profiler => Err(RenderError::UnsupportedWrapper("Profiler")),
            ElementType::Suspense => Err(RenderError::UnsupportedWrapper("Suspense")),
            ElementType::Portal => Err(RenderError::UnsupportedWrapper("Portal")),
        }
    }

    fn invoke(&mut self, component: &Component, props: &Props) -> Result<View> {
        tracing::trace!(component = component.name(), "rendering component");
        let mut dispatcher =
            SinglePassDispatcher::new(component.name(), &self.contexts, &mut self.ids);
        let mut hooks = Hooks::new(&mut dispatcher);
        match component.call(props, &mut hooks) {
            Poll::Ready(view) => Ok(view),
            Poll::Pending => Err(RenderError::Suspended(component.name().to_owned())),
        }
    }

    fn render_primitive(&mut self, kind: ComponentKind, props: &Props) -> Result<Node> {
        if self.depth >= MAX_ELEMENT_DEPTH {
            return Err(RenderError::TooDeep {
                component: kind.name().to_owned(),
                max: MAX_ELEMENT_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.render_fields(kind, props);
        self.depth -= 1;
        result
    }

    fn render_fields(&mut self, kind: ComponentKind, props: &Props) -> Result<Node> {
        let mut element = wire::Element::new(kind);
        for (name, prop) in props.iter() {
            if name == CHILDREN_PROPERTY {
                element.children = self.render_children(kind, &props.children())?;
                continue;
            }
            if is_reserved_name(name) {
                return Err(RenderError::ReservedName {
                    component: kind.name().to_owned(),
                    name: name.to_owned(),
                });
            }
            match prop {
                Prop::Value(value) if name == ID_PROPERTY => {
                    element.id = element_id(kind, value)?;
                }
                Prop::Value(Value::Null) => {}
                Prop::Value(value)
                    if name == STYLE_PROPERTY || value.is_object() || value.is_array() =>
                {
                    return Err(RenderError::InvalidProp {
                        component: kind.name().to_owned(),
                        prop: name.to_owned(),
                    });
                }
                Prop::Value(value) => {
                    element
                        .props
                        .insert(compress_name(name).to_owned(), PropValue::Scalar(value.clone()));
                }
                Prop::Style(style) => {
                    let compressed =
                        style::compress(style).map_err(|key| RenderError::ReservedName {
                            component: kind.name().to_owned(),
                            name: key,
                        })?;
                    if compressed.is_empty() {
                        continue;
                    }
                    let value = if name == STYLE_PROPERTY {
                        self.styles.intern(compressed)
                    } else {
                        StyleValue::Inline(compressed)
                    };
                    element
                        .props
                        .insert(compress_name(name).to_owned(), PropValue::Style(value));
                }
                Prop::View(view) => {
                    let node = self.scoped(kind.name(), |this| this.render_view(view))?;
                    if !node.is_empty() {
                        element
                            .props
                            .insert(compress_name(name).to_owned(), PropValue::Node(node));
                    }
                }
            }
        }
        Ok(element.into())
    }

    fn render_children(&mut self, kind: ComponentKind, children: &View) -> Result<Node> {
        if kind.renders_text() {
            return Ok(self
                .text_content(children, kind.name())?
                .map_or(Node::Empty, Node::Text));
        }
        self.scoped(kind.name(), |this| this.render_view(children))
    }

    /// Collapses the children of a text element into one string.
    ///
    /// Wrappers and components are resolved as usual, but any primitive element
    /// is an error. Identity sharing does not apply here.
    fn text_content(&mut self, view: &View, owner: &str) -> Result<Option<String>> {
        match view {
            View::Empty => Ok(None),
            View::Str(text) => Ok(Some(text.clone())),
            View::Int(value) => Ok(Some(value.to_string())),
            View::Float(value) => Ok(Some(value.to_string())),
            View::BigInt(value) => Ok(Some(value.to_string())),
            View::Bool(value) => Ok(Some(value.to_string())),
            View::List(items) => {
                let mut text: Option<String> = None;
                for item in items {
                    if let Some(part) = self.text_content(item, owner)? {
                        text.get_or_insert_with(String::new).push_str(&part);
                    }
                }
                Ok(text)
            }
            View::Element(element) => {
                self.resolve(&element.ty, &element.props, &mut |this, resolved| match resolved {
                    Resolved::Primitive(kind, _) => Err(RenderError::TextContent {
                        component: owner.to_owned(),
                        found: kind.name().to_owned(),
                    }),
                    Resolved::View(view) => this.text_content(&view, owner),
                })
            }
        }
    }
}

fn element_id(kind: ComponentKind, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id.clone())),
        Value::Number(id) => Ok(Some(id.to_string())),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(RenderError::InvalidProp {
            component: kind.name().to_owned(),
            prop: ID_PROPERTY.to_owned(),
        }),
    }
}
