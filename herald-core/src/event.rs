//! The event value object.
//!
//! An [`Event`] carries explicit metadata (identity, flags, result stack) plus
//! one ordered payload map for listener-defined data. Listeners receive it as
//! `&mut Event` and communicate through the payload, the flags and, on
//! chained events, their return values.

use crate::{
    dispatcher::Dispatcher,
    error::{DispatchError, SharedError},
    kind::{self, EventKind, Kind},
};
use bitflags::bitflags;
use serde::Serialize;
use serde_json::Value;
use std::{
    any::Any,
    borrow::Cow,
    fmt,
    sync::{Arc, Weak},
};

/// Ordered key/value data attached to an event.
pub type Payload = serde_json::Map<String, Value>;

bitflags! {
    /// State flags of an [`Event`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u8 {
        /// Only forced listeners still run.
        const CANCELLED = 1 << 0;
        /// No further listener runs in the current pass.
        const PROPAGATION_STOPPED = 1 << 1;
        /// Listener return values are pushed onto the result stack.
        const CHAINED = 1 << 2;
    }
}

/// An event published through a [`Dispatcher`].
///
/// # Example
///
/// ```rust
/// use herald_core::Event;
/// use serde_json::json;
///
/// let mut event = Event::hook("create").with("x", json!(1));
/// event.push_result(json!("first"));
/// event.push_result(json!("second"));
///
/// assert_eq!(event.get("x"), Some(&json!(1)));
/// assert_eq!(event.result(), Some(&json!("second")));
/// ```
#[derive(Clone, Default)]
pub struct Event {
    name: Option<String>,
    kind: EventKind,
    payload: Payload,
    context: Option<Arc<dyn Any + Send + Sync>>,
    flags: EventFlags,
    results: Vec<Value>,
    error: Option<SharedError>,
    dispatcher: Option<Weak<dyn Dispatcher>>,
}

impl Event {
    /// Create an unnamed event of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Create an event for a type implementing [`Kind`].
    pub fn of<K: Kind>() -> Self {
        Self::new(K::kind())
    }

    /// Create an event that goes by an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a named event whose listener results are chained.
    pub fn hook(name: impl Into<String>) -> Self {
        Self::named(name).chained()
    }

    /// Create a timer tick.
    pub fn timer() -> Self {
        Self::named(kind::TIMER)
    }

    /// Create an event representing a listener failure while handling `source`.
    ///
    /// The payload carries `message` (the error's display text) and `source`
    /// (the failed event's identity).
    pub fn from_error(
        identity: impl Into<Cow<'static, str>>,
        error: SharedError,
        source: &Event,
    ) -> Self {
        let mut event = Self::new(EventKind::new(identity));
        event.insert("message", Value::String(error.to_string()));
        event.insert("source", Value::String(source.identity().to_owned()));
        event.error = Some(error);
        event
    }

    /// Set the explicit name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Insert a payload entry.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge the fields of a serializable value into the payload.
    ///
    /// Non-object values are stored under the key `value`.
    pub fn with_payload_from<T: Serialize>(
        mut self,
        data: &T,
    ) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(data)? {
            Value::Object(map) => self.payload.extend(map),
            other => {
                self.payload.insert("value".into(), other);
            }
        }
        Ok(self)
    }

    /// Attach an opaque reference to the publisher.
    pub fn with_context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Enable result chaining.
    pub fn chained(mut self) -> Self {
        self.flags.insert(EventFlags::CHAINED);
        self
    }

    /// The explicit name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The type-side identity.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The primary identity: the explicit name, or else the concrete type.
    pub fn identity(&self) -> &str {
        self.name().unwrap_or_else(|| self.kind.type_name())
    }

    /// Name, type, ancestors and capabilities, in resolution order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.name().into_iter().chain(self.kind.identities())
    }

    /// Whether the event is reachable under `identity`.
    pub fn is_a(&self, identity: &str) -> bool {
        self.identities().any(|id| id == identity)
    }

    /// Whether this is a timer tick.
    pub fn is_timer(&self) -> bool {
        self.is_a(kind::TIMER)
    }

    /// The payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Mutable access to the payload.
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Look up a payload entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Insert a payload entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.payload.insert(key.into(), value)
    }

    /// The publisher context, if it has type `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_deref()?.downcast_ref()
    }

    /// Current flags.
    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Whether the event has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flags.contains(EventFlags::CANCELLED)
    }

    /// Cancel the event; only forced listeners still run.
    pub fn cancel(&mut self) {
        self.set_cancelled(true);
    }

    /// Set or clear the cancelled flag.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.flags.set(EventFlags::CANCELLED, cancelled);
    }

    /// Whether a listener stopped propagation.
    pub fn is_propagation_stopped(&self) -> bool {
        self.flags.contains(EventFlags::PROPAGATION_STOPPED)
    }

    /// Prevent any later listener in the current pass from running.
    pub fn stop_propagation(&mut self) {
        self.flags.insert(EventFlags::PROPAGATION_STOPPED);
    }

    /// Let listeners run again; called at the start of every dispatch pass.
    pub fn resume_propagation(&mut self) {
        self.flags.remove(EventFlags::PROPAGATION_STOPPED);
    }

    /// Whether listener results are chained.
    pub fn is_chained(&self) -> bool {
        self.flags.contains(EventFlags::CHAINED)
    }

    /// The most recent chained result.
    pub fn result(&self) -> Option<&Value> {
        self.results.last()
    }

    /// Every chained result of the current pass, oldest first.
    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// Push a result onto the stack.
    pub fn push_result(&mut self, value: Value) {
        self.results.push(value);
    }

    /// Drop the result stack; called at the start of every dispatch pass.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    /// The listener error this event represents.
    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    /// Whether this event represents a listener error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The dispatcher this event is bound to, while it is still alive.
    ///
    /// Listeners use this to publish follow-up events.
    pub fn dispatcher(&self) -> Option<Arc<dyn Dispatcher>> {
        self.dispatcher.as_ref()?.upgrade()
    }

    /// Whether the event has been bound to a dispatcher.
    pub fn is_bound(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Bind the event to `dispatcher`.
    ///
    /// Binding happens once. Binding again to the same dispatcher is a no-op;
    /// binding to any other dispatcher fails with
    /// [`DispatchError::DoubleAttach`].
    pub fn bind(&mut self, dispatcher: Weak<dyn Dispatcher>) -> Result<(), DispatchError> {
        if let Some(bound) = &self.dispatcher {
            if Weak::ptr_eq(bound, &dispatcher) {
                return Ok(());
            }
            return Err(DispatchError::DoubleAttach {
                identity: self.identity().to_owned(),
            });
        }
        self.dispatcher = Some(dispatcher);
        Ok(())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .field("flags", &self.flags)
            .field("results", &self.results)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use serde_json::json;

    struct NullDispatcher;

    impl Dispatcher for NullDispatcher {
        fn publish(&self, _event: Event) -> Result<Option<Value>, DispatchError> {
            Ok(None)
        }

        fn dispatch(&self, _event: &mut Event) -> Result<Option<Value>, DispatchError> {
            Ok(None)
        }
    }

    #[test]
    fn test_named_event_identities() {
        let event = Event::named("create");
        assert_eq!(event.identity(), "create");
        assert_eq!(event.identities().collect::<Vec<_>>(), ["create", "event"]);
        assert!(!event.is_chained());
        assert!(Event::hook("create").is_chained());
    }

    #[test]
    fn test_typed_event_identity_falls_back_to_type() {
        let event = Event::new(EventKind::new("user.created").with_ancestor("user"));
        assert_eq!(event.name(), None);
        assert_eq!(event.identity(), "user.created");
        assert!(event.is_a("user"));
        assert!(!event.is_timer());
        assert!(Event::timer().is_timer());
    }

    #[test]
    fn test_payload_keeps_insertion_order() {
        let event = Event::named("e")
            .with("zeta", json!(1))
            .with("alpha", json!(2));
        let keys: Vec<&String> = event.payload().keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_payload_from_struct() {
        #[derive(Serialize)]
        struct Post {
            user: &'static str,
            likes: u32,
        }

        let event = Event::named("post")
            .with_payload_from(&Post {
                user: "garrett",
                likes: 3,
            })
            .unwrap();
        assert_eq!(event.get("user"), Some(&json!("garrett")));
        assert_eq!(event.get("likes"), Some(&json!(3)));

        let scalar = Event::named("n").with_payload_from(&7).unwrap();
        assert_eq!(scalar.get("value"), Some(&json!(7)));
    }

    #[test]
    fn test_flags() {
        let mut event = Event::named("e");
        assert!(!event.is_cancelled());
        event.cancel();
        event.stop_propagation();
        assert!(event.is_cancelled());
        assert!(event.is_propagation_stopped());
        event.set_cancelled(false);
        assert_eq!(event.flags(), EventFlags::PROPAGATION_STOPPED);
    }

    #[test]
    fn test_context_downcast() {
        let event = Event::named("e").with_context("publisher");
        assert_eq!(event.context::<&str>(), Some(&"publisher"));
        assert_eq!(event.context::<u32>(), None);
    }

    #[test]
    fn test_error_event() {
        let source = Event::named("create");
        let error: SharedError = Arc::from(BoxError::from("disk full"));
        let event = Event::from_error(crate::kind::ERROR, error, &source);

        assert!(event.is_error());
        assert_eq!(event.identity(), "error");
        assert_eq!(event.get("message"), Some(&json!("disk full")));
        assert_eq!(event.get("source"), Some(&json!("create")));
    }

    #[test]
    fn test_bind_once() {
        let first: Arc<dyn Dispatcher> = Arc::new(NullDispatcher);
        let second: Arc<dyn Dispatcher> = Arc::new(NullDispatcher);
        let mut event = Event::named("e");

        event.bind(Arc::downgrade(&first)).unwrap();
        event.bind(Arc::downgrade(&first)).unwrap();
        assert!(event.dispatcher().is_some());

        let err = event.bind(Arc::downgrade(&second)).unwrap_err();
        assert!(matches!(err, DispatchError::DoubleAttach { identity } if identity == "e"));
    }

    #[test]
    fn test_results_stack() {
        let mut event = Event::hook("h");
        assert_eq!(event.result(), None);
        event.push_result(json!(1));
        event.push_result(json!(2));
        assert_eq!(event.results(), [json!(1), json!(2)]);
        event.clear_results();
        assert!(event.results().is_empty());
    }

    #[test]
    fn test_resume_propagation() {
        let mut event = Event::named("e");
        event.cancel();
        event.stop_propagation();
        assert!(event.is_propagation_stopped());

        event.resume_propagation();
        assert!(!event.is_propagation_stopped());
        assert!(event.is_cancelled());
    }
}
