//! # Listeners
//!
//! A [`Listener`] is the unit of behaviour invoked when its identity matches
//! a published event. It receives the event mutably and may:
//!
//! - read and write the payload,
//! - cancel the event or stop propagation,
//! - return a value, which is chained onto the result stack of hook events.
//!
//! Registries store listeners as [`ListenerRef`], which also carries the
//! descriptor used to find a registration again when unsubscribing.

use crate::{error::BoxError, event::Event};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// What a listener returns.
pub type ListenerResult = Result<Option<Value>, BoxError>;

/// A unit of behaviour invoked with a published event.
///
/// Plain closures implement this trait:
///
/// ```rust
/// use herald_core::{BoxError, Event, Listener};
/// use serde_json::{Value, json};
///
/// let double = |event: &mut Event| -> Result<Option<Value>, BoxError> {
///     let x = event.get("x").and_then(Value::as_i64).unwrap_or(0);
///     Ok(Some(json!(x * 2)))
/// };
///
/// let mut event = Event::named("n").with("x", json!(21));
/// assert_eq!(double.on_event(&mut event).unwrap(), Some(json!(42)));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Listeners are `Fn(&mut Event) -> Result<Option<Value>, BoxError>` or implement `on_event`."
)]
pub trait Listener: Send + Sync + 'static {
    /// Handle the event.
    fn on_event(&self, event: &mut Event) -> ListenerResult;

    /// Only invoke this listener when `predicate` accepts the event.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        Self: Sized,
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Filter {
            listener: self,
            predicate,
        }
    }

    /// Transform the value this listener returns.
    fn map<F>(self, mapper: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Map {
            listener: self,
            mapper,
        }
    }
}

impl<F> Listener for F
where
    F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        self(event)
    }
}

/// Listener returned by [`Listener::filter`].
pub struct Filter<L, F> {
    listener: L,
    predicate: F,
}

impl<L, F> Listener for Filter<L, F>
where
    L: Listener,
    F: Fn(&Event) -> bool + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        if (self.predicate)(&*event) {
            self.listener.on_event(event)
        } else {
            Ok(None)
        }
    }
}

/// Listener returned by [`Listener::map`].
pub struct Map<L, F> {
    listener: L,
    mapper: F,
}

impl<L, F> Listener for Map<L, F>
where
    L: Listener,
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        Ok(self.listener.on_event(event)?.map(&self.mapper))
    }
}

/// Identifies a bound-method listener independently of the `Arc` wrapping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Descriptor {
    /// Matched by reference identity only.
    Anonymous,
    /// A method of a shared owner, matched by owner address and method key.
    Method {
        /// Address of the owning object.
        owner: usize,
        /// The method key.
        key: &'static str,
    },
}

struct MethodListener<T> {
    owner: Arc<T>,
    method: fn(&T, &mut Event) -> ListenerResult,
}

impl<T: Send + Sync + 'static> Listener for MethodListener<T> {
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        (self.method)(&self.owner, event)
    }
}

/// A shared, comparable handle to a listener.
///
/// Two handles match when they point at the same listener allocation, or
/// when both were created with [`ListenerRef::method`] for the same owner and
/// method key.
#[derive(Clone)]
pub struct ListenerRef {
    inner: Arc<dyn Listener>,
    descriptor: Descriptor,
}

impl ListenerRef {
    /// Wrap any listener.
    pub fn new<L: Listener>(listener: L) -> Self {
        Self {
            inner: Arc::new(listener),
            descriptor: Descriptor::Anonymous,
        }
    }

    /// Wrap a closure. Same as [`ListenerRef::new`] but guides closure type inference.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
    {
        Self::new(f)
    }

    /// Wrap a method of a shared object.
    ///
    /// Handles built from the same `owner` and `key` match each other, so a
    /// method can be unsubscribed without keeping the original handle.
    pub fn method<T>(owner: &Arc<T>, key: &'static str, method: fn(&T, &mut Event) -> ListenerResult) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            descriptor: Descriptor::Method {
                owner: Arc::as_ptr(owner) as *const () as usize,
                key,
            },
            inner: Arc::new(MethodListener {
                owner: Arc::clone(owner),
                method,
            }),
        }
    }

    /// Invoke the listener.
    pub fn on_event(&self, event: &mut Event) -> ListenerResult {
        self.inner.on_event(event)
    }

    /// The descriptor used for matching.
    pub fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    /// Whether `other` designates the same listener.
    pub fn matches(&self, other: &ListenerRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
            || (self.descriptor != Descriptor::Anonymous && self.descriptor == other.descriptor)
    }
}

impl fmt::Debug for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRef")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
