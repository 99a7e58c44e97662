//! Ambient values passed down the tree.
//!
//! A [`Context`] is a typed key with a default. A provider element pushes a
//! value for its subtree and pops it on the way out; readers see the innermost
//! value or the default. The stack lives in the renderer, one per render call.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::component::ElementType;
use crate::view::{Element, View};

struct KeyInner {
    name: Rc<str>,
    default: Rc<dyn Any>,
}

/// Untyped identity of a [`Context`]. Equal only to its own clones.
#[derive(Clone)]
pub struct ContextKey(Rc<KeyInner>);

impl ContextKey {
    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The value read when no provider is active.
    #[must_use]
    pub fn default_value(&self) -> Rc<dyn Any> {
        Rc::clone(&self.0.default)
    }
}

impl PartialEq for ContextKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ContextKey {}

impl Hash for ContextKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name()).finish()
    }
}

/// A typed ambient value with a default.
///
/// ```
/// use islet::prelude::*;
///
/// let accent = Context::new("Accent", String::from("#007AFF"));
/// let tree = accent.provider(
///     String::from("#FF9500"),
///     accent.consumer(|color: &String| text(color.clone())),
/// );
/// # let _ = tree;
/// ```
pub struct Context<T> {
    key: ContextKey,
    default: Rc<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Context<T> {
    /// Creates a context whose readers see `default` outside any provider.
    pub fn new(name: impl Into<Rc<str>>, default: T) -> Self {
        let default = Rc::new(default);
        let erased: Rc<dyn Any> = default.clone();
        Self {
            key: ContextKey(Rc::new(KeyInner {
                name: name.into(),
                default: erased,
            })),
            default,
            _marker: PhantomData,
        }
    }

    /// The untyped key.
    #[must_use]
    pub const fn key(&self) -> &ContextKey {
        &self.key
    }

    /// The default value.
    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Provides `value` to `children`.
    pub fn provider(&self, value: T, children: impl Into<View>) -> Element {
        Element::new(ElementType::Provider {
            context: self.key.clone(),
            value: Rc::new(value),
        })
        .child(children)
    }

    /// Renders `render` with the nearest provided value.
    pub fn consumer<F, V>(&self, render: F) -> Element
    where
        F: Fn(&T) -> V + 'static,
        V: Into<View>,
    {
        let fallback = Rc::clone(&self.default);
        Element::new(ElementType::Consumer {
            context: self.key.clone(),
            render: Rc::new(move |value: &dyn Any| {
                let value = value.downcast_ref::<T>().unwrap_or(&*fallback);
                render(value).into()
            }),
        })
    }
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            default: Rc::clone(&self.default),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.key.name()).finish()
    }
}

/// Per-key stacks of provided values.
#[derive(Default)]
pub struct ContextStack {
    frames: HashMap<ContextKey, Vec<Rc<dyn Any>>>,
}

impl ContextStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a provider.
    pub fn push(&mut self, key: &ContextKey, value: Rc<dyn Any>) {
        self.frames.entry(key.clone()).or_default().push(value);
    }

    /// Leaves a provider, returning its value.
    pub fn pop(&mut self, key: &ContextKey) -> Option<Rc<dyn Any>> {
        let stack = self.frames.get_mut(key)?;
        let value = stack.pop();
        if stack.is_empty() {
            self.frames.remove(key);
        }
        value
    }

    /// The innermost provided value, or the key's default.
    #[must_use]
    pub fn read(&self, key: &ContextKey) -> Rc<dyn Any> {
        self.frames
            .get(key)
            .and_then(|stack| stack.last())
            .map_or_else(|| key.default_value(), Rc::clone)
    }

    /// How many providers of `key` are active.
    #[must_use]
    pub fn depth(&self, key: &ContextKey) -> usize {
        self.frames.get(key).map_or(0, Vec::len)
    }

    /// Whether no provider is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Debug for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.frames.iter().map(|(key, stack)| (key.name(), stack.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read<T: Clone + 'static>(stack: &ContextStack, context: &Context<T>) -> T {
        stack
            .read(context.key())
            .downcast_ref::<T>()
            .cloned()
            .unwrap()
    }

    #[test]
    fn innermost_value_wins() {
        let theme = Context::new("Theme", "light");
        let mut stack = ContextStack::new();
        assert_eq!(read(&stack, &theme), "light");

        stack.push(theme.key(), Rc::new("dark"));
        stack.push(theme.key(), Rc::new("contrast"));
        assert_eq!(read(&stack, &theme), "contrast");
        assert_eq!(stack.depth(theme.key()), 2);

        stack.pop(theme.key());
        assert_eq!(read(&stack, &theme), "dark");
        stack.pop(theme.key());
        assert_eq!(read(&stack, &theme), "light");
        assert!(stack.is_empty());
    }

    #[test]
    fn keys_are_compared_by_identity() {
        let a = Context::new("Same", 1);
        let b = Context::new("Same", 1);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.clone().key());

        let mut stack = ContextStack::new();
        stack.push(a.key(), Rc::new(7));
        assert_eq!(read(&stack, &a), 7);
        assert_eq!(read(&stack, &b), 1);
    }
}
