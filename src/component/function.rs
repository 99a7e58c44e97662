//! Function components and lazy loaders.

use core::fmt;
use std::rc::Rc;
use std::task::Poll;

use crate::hooks::Hooks;
use crate::view::{Props, View};

use super::ElementType;

type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> Poll<View>;
type LoadFn = dyn Fn() -> Poll<ElementType>;

/// A named function component.
///
/// The body runs once per render with the element's props and a [`Hooks`]
/// handle. It must finish synchronously: a body that reports
/// [`Poll::Pending`] fails the render with an error naming the component.
///
/// ```
/// use islet::prelude::*;
///
/// let greeting = Component::new("Greeting", |props, _hooks| {
///     text(props.str("name").unwrap_or("there").to_owned())
/// });
/// let view: View = component(&greeting).prop("name", "Ada").into();
/// # let _ = view;
/// ```
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    /// Creates a component whose body always completes.
    pub fn new<F, V>(name: impl Into<Rc<str>>, body: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> V + 'static,
        V: Into<View>,
    {
        Self {
            name: name.into(),
            render: Rc::new(move |props, hooks| Poll::Ready(body(props, hooks).into())),
        }
    }

    /// Creates a component whose body may report that it is still waiting.
    pub fn suspending<F>(name: impl Into<Rc<str>>, body: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Poll<View> + 'static,
    {
        Self {
            name: name.into(),
            render: Rc::new(body),
        }
    }

    /// The display name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, props: &Props, hooks: &mut Hooks<'_>) -> Poll<View> {
        (self.render)(props, hooks)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

/// Produces an element type on demand.
#[derive(Clone)]
pub struct LazyLoader {
    name: Rc<str>,
    load: Rc<LoadFn>,
}

impl LazyLoader {
    /// Creates a loader. Returning [`Poll::Pending`] fails the render.
    pub fn new<F>(name: impl Into<Rc<str>>, load: F) -> Self
    where
        F: Fn() -> Poll<ElementType> + 'static,
    {
        Self {
            name: name.into(),
            load: Rc::new(load),
        }
    }

    /// A loader that resolves to a function component right away.
    #[must_use]
    pub fn ready(component: Component) -> Self {
        let name = Rc::clone(&component.name);
        Self::new(name, move || Poll::Ready(ElementType::Function(component.clone())))
    }

    /// The display name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn load(&self) -> Poll<ElementType> {
        (self.load)()
    }
}

impl fmt::Debug for LazyLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyLoader").field(&self.name).finish()
    }
}
