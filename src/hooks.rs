//! State primitives available to function components.
//!
//! Components receive a [`Hooks`] handle. It offers the familiar stateful
//! vocabulary but runs it with single-pass semantics: memo factories run
//! once, refs are plain boxes, setters are inert and anything that would
//! schedule later work is dropped. The parts that depend on the surrounding
//! render (context reads, deferred work and ids) go through a [`Dispatcher`],
//! swapped in by the renderer for the duration of one component call.

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use std::any::Any;
use std::rc::Rc;

use crate::context::{Context, ContextKey, ContextStack};

/// Work a component asked to run after rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// A passive effect.
    Effect,
    /// A layout effect.
    LayoutEffect,
    /// An insertion effect.
    InsertionEffect,
    /// An imperative handle assignment.
    ImperativeHandle,
    /// An external store subscription.
    Subscription,
}

/// The render-dependent half of the hook vocabulary.
pub trait Dispatcher {
    /// Name of the component being rendered.
    fn component(&self) -> &str;

    /// Reads the innermost value provided for `key`, or its default.
    fn read_context(&mut self, key: &ContextKey) -> Rc<dyn Any>;

    /// Accepts work meant to run after the render commits.
    fn defer(&mut self, work: Deferred);

    /// Returns an id unique within the current render.
    fn next_id(&mut self) -> String;
}

/// The dispatcher used for one-shot serialization.
///
/// Context reads see the renderer's provider stack, deferred work is
/// discarded, and ids count up from zero across the whole render.
pub struct SinglePassDispatcher<'a> {
    component: &'a str,
    contexts: &'a ContextStack,
    ids: &'a mut usize,
}

impl<'a> SinglePassDispatcher<'a> {
    /// Creates a dispatcher for one component call.
    pub const fn new(component: &'a str, contexts: &'a ContextStack, ids: &'a mut usize) -> Self {
        Self {
            component,
            contexts,
            ids,
        }
    }
}

impl Dispatcher for SinglePassDispatcher<'_> {
    fn component(&self) -> &str {
        self.component
    }

    fn read_context(&mut self, key: &ContextKey) -> Rc<dyn Any> {
        self.contexts.read(key)
    }

    fn defer(&mut self, work: Deferred) {
        tracing::trace!(component = self.component, ?work, "dropping deferred work");
    }

    fn next_id(&mut self) -> String {
        let id = format!(":i{}:", *self.ids);
        *self.ids += 1;
        id
    }
}

impl fmt::Debug for SinglePassDispatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinglePassDispatcher")
            .field("component", &self.component)
            .field("next_id", &*self.ids)
            .finish_non_exhaustive()
    }
}

/// The hook handle passed to a function component.
pub struct Hooks<'a> {
    dispatcher: &'a mut dyn Dispatcher,
}

impl<'a> Hooks<'a> {
    /// Wraps a dispatcher.
    pub fn new(dispatcher: &'a mut dyn Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Runs `factory` and returns its value.
    pub fn use_memo<T>(&mut self, factory: impl FnOnce() -> T) -> T {
        factory()
    }

    /// Returns `callback` unchanged.
    pub fn use_callback<F>(&mut self, callback: F) -> F {
        callback
    }

    /// A mutable box with no change tracking.
    pub fn use_ref<T>(&mut self, initial: T) -> Rc<RefCell<T>> {
        Rc::new(RefCell::new(initial))
    }

    /// The initial state and a setter that never triggers a re-render.
    pub fn use_state<T>(&mut self, initial: T) -> (T, StateSetter<T>) {
        (initial, StateSetter::new(self.dispatcher.component()))
    }

    /// The initial state and a dispatch handle that never runs the reducer.
    pub fn use_reducer<S, A, R>(&mut self, reducer: R, initial: S) -> (S, Dispatch<A>)
    where
        R: Fn(&S, A) -> S,
    {
        drop(reducer);
        (initial, Dispatch::new(self.dispatcher.component()))
    }

    /// The innermost value provided for `context`, or its default.
    pub fn use_context<T: Clone + 'static>(&mut self, context: &Context<T>) -> T {
        let value = self.dispatcher.read_context(context.key());
        value
            .downcast_ref::<T>()
            .unwrap_or_else(|| context.default_value())
            .clone()
    }

    /// Registers a passive effect, which never runs.
    pub fn use_effect(&mut self, effect: impl FnOnce()) {
        drop(effect);
        self.dispatcher.defer(Deferred::Effect);
    }

    /// Registers a layout effect, which never runs.
    pub fn use_layout_effect(&mut self, effect: impl FnOnce()) {
        drop(effect);
        self.dispatcher.defer(Deferred::LayoutEffect);
    }

    /// Registers an insertion effect, which never runs.
    pub fn use_insertion_effect(&mut self, effect: impl FnOnce()) {
        drop(effect);
        self.dispatcher.defer(Deferred::InsertionEffect);
    }

    /// Registers an imperative handle, which is never created.
    pub fn use_imperative_handle<T>(&mut self, create: impl FnOnce() -> T) {
        drop(create);
        self.dispatcher.defer(Deferred::ImperativeHandle);
    }

    /// Never pending, with a transition starter that does nothing.
    pub fn use_transition(&mut self) -> (bool, Transition) {
        (false, Transition::new(self.dispatcher.component()))
    }

    /// Returns `value` unchanged.
    pub fn use_deferred_value<T>(&mut self, value: T) -> T {
        value
    }

    /// Reads the store snapshot once. The subscription is never made.
    pub fn use_sync_external_store<T, U>(
        &mut self,
        subscribe: impl FnOnce(Rc<dyn Fn()>) -> U,
        get_snapshot: impl FnOnce() -> T,
    ) -> T {
        drop(subscribe);
        self.dispatcher.defer(Deferred::Subscription);
        get_snapshot()
    }

    /// An id unique within the current render, such as `:i0:`.
    pub fn use_id(&mut self) -> String {
        self.dispatcher.next_id()
    }

    /// Logs `value` at trace level.
    pub fn use_debug_value<T: fmt::Debug>(&mut self, value: &T) {
        tracing::trace!(component = self.dispatcher.component(), ?value, "debug value");
    }
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("component", &self.dispatcher.component())
            .finish()
    }
}

/// A state setter from [`Hooks::use_state`]. Updates are ignored.
pub struct StateSetter<T> {
    component: Rc<str>,
    _marker: PhantomData<fn(T)>,
}

impl<T> StateSetter<T> {
    fn new(component: &str) -> Self {
        Self {
            component: component.into(),
            _marker: PhantomData,
        }
    }

    /// Drops `value`.
    pub fn set(&self, value: T) {
        drop(value);
        tracing::trace!(component = &*self.component, "ignoring state update");
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            component: Rc::clone(&self.component),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateSetter").field(&self.component).finish()
    }
}

/// A reducer dispatch handle from [`Hooks::use_reducer`]. Actions are ignored.
pub struct Dispatch<A> {
    component: Rc<str>,
    _marker: PhantomData<fn(A)>,
}

impl<A> Dispatch<A> {
    fn new(component: &str) -> Self {
        Self {
            component: component.into(),
            _marker: PhantomData,
        }
    }

    /// Drops `action`.
    pub fn dispatch(&self, action: A) {
        drop(action);
        tracing::trace!(component = &*self.component, "ignoring dispatched action");
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            component: Rc::clone(&self.component),
            _marker: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dispatch").field(&self.component).finish()
    }
}

/// A transition starter from [`Hooks::use_transition`].
#[derive(Debug, Clone)]
pub struct Transition {
    component: Rc<str>,
}

impl Transition {
    fn new(component: &str) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Drops `update` without running it.
    pub fn start(&self, update: impl FnOnce()) {
        drop(update);
        tracing::trace!(component = &*self.component, "ignoring transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct Recording {
        contexts: ContextStack,
        deferred: Vec<Deferred>,
        ids: usize,
    }

    impl Dispatcher for Recording {
        fn component(&self) -> &str {
            "Recording"
        }

        fn read_context(&mut self, key: &ContextKey) -> Rc<dyn Any> {
            self.contexts.read(key)
        }

        fn defer(&mut self, work: Deferred) {
            self.deferred.push(work);
        }

        fn next_id(&mut self) -> String {
            self.ids += 1;
            format!("r{}", self.ids)
        }
    }

    #[test]
    fn deferred_work_never_runs() {
        let ran = Cell::new(false);
        let mut dispatcher = Recording::default();
        let mut hooks = Hooks::new(&mut dispatcher);
        hooks.use_effect(|| ran.set(true));
        hooks.use_layout_effect(|| ran.set(true));
        hooks.use_insertion_effect(|| ran.set(true));
        hooks.use_imperative_handle(|| ran.set(true));
        let snapshot = hooks.use_sync_external_store(|_notify| ran.set(true), || 42);
        let (pending, transition) = hooks.use_transition();
        transition.start(|| ran.set(true));

        assert_eq!(snapshot, 42);
        assert!(!pending);
        assert!(!ran.get());
        assert_eq!(
            dispatcher.deferred,
            [
                Deferred::Effect,
                Deferred::LayoutEffect,
                Deferred::InsertionEffect,
                Deferred::ImperativeHandle,
                Deferred::Subscription,
            ]
        );
    }

    #[test]
    fn state_is_write_once() {
        let mut dispatcher = Recording::default();
        let mut hooks = Hooks::new(&mut dispatcher);
        let (count, set_count) = hooks.use_state(3);
        set_count.set(4);
        let (total, dispatch) = hooks.use_reducer(|state: &i32, action: i32| state + action, 10);
        dispatch.dispatch(5);
        assert_eq!((count, total), (3, 10));

        let calls = Cell::new(0);
        let value = hooks.use_memo(|| {
            calls.set(calls.get() + 1);
            "computed"
        });
        assert_eq!((value, calls.get()), ("computed", 1));

        let cell = hooks.use_ref(Vec::<u8>::new());
        cell.borrow_mut().push(1);
        assert_eq!(cell.borrow().as_slice(), &[1_u8]);
    }

    #[test]
    fn context_reads_go_through_the_dispatcher() {
        let locale = Context::new("Locale", String::from("en"));
        let mut dispatcher = Recording::default();
        dispatcher
            .contexts
            .push(locale.key(), Rc::new(String::from("fr")));
        let mut hooks = Hooks::new(&mut dispatcher);
        assert_eq!(hooks.use_context(&locale), "fr");
        assert_eq!(hooks.use_id(), "r1");
    }

    #[test]
    fn single_pass_ids_are_shared_across_components() {
        let contexts = ContextStack::new();
        let mut ids = 0;
        let first = SinglePassDispatcher::new("A", &contexts, &mut ids).next_id();
        let second = SinglePassDispatcher::new("B", &contexts, &mut ids).next_id();
        assert_eq!((first.as_str(), second.as_str()), (":i0:", ":i1:"));
    }
}
