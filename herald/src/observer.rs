//! Observer groups.
//!
//! An [`Observer`] bundles several handlers that are attached to and detached
//! from an orchestrator as one unit.

use crate::orchestrator::{ReplayOutcome, Subscription};
use herald_core::ListenerRef;
use herald_std::{SubscribeOptions, SubscriptionId};
use std::sync::Arc;

/// One row of an observer's handler table.
#[derive(Debug, Clone)]
pub struct Handler {
    /// Identity to subscribe under.
    pub identity: String,
    /// The listener.
    pub listener: ListenerRef,
    /// Registration options.
    pub options: SubscribeOptions,
}

impl Handler {
    /// A handler with default options.
    pub fn new(identity: impl Into<String>, listener: ListenerRef) -> Self {
        Self {
            identity: identity.into(),
            listener,
            options: SubscribeOptions::new(),
        }
    }

    /// Replace the registration options.
    pub fn with_options(mut self, options: SubscribeOptions) -> Self {
        self.options = options;
        self
    }
}

/// A group of handlers attached together.
///
/// # Example
///
/// ```rust
/// use herald::{Event, Handler, ListenerRef, ListenerResult, Observer, Orchestrator};
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// #[derive(Default)]
/// struct Audit {
///     seen: AtomicUsize,
/// }
///
/// impl Audit {
///     fn on_any(&self, _event: &mut Event) -> ListenerResult {
///         self.seen.fetch_add(1, Ordering::SeqCst);
///         Ok(None)
///     }
/// }
///
/// impl Observer for Audit {
///     fn handlers(self: &Arc<Self>) -> Vec<Handler> {
///         vec![Handler::new("any", ListenerRef::method(self, "on_any", Audit::on_any))]
///     }
/// }
///
/// let orchestrator = Orchestrator::new();
/// let audit = Arc::new(Audit::default());
/// let attached = orchestrator.attach(&audit).unwrap();
///
/// orchestrator.publish(Event::named("a")).unwrap();
/// assert_eq!(orchestrator.detach(&attached), 1);
/// orchestrator.publish(Event::named("b")).unwrap();
/// assert_eq!(audit.seen.load(Ordering::SeqCst), 1);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an Observer",
    label = "missing `Observer` implementation",
    note = "Implement `Observer::handlers` to declare the identities `{Self}` listens to."
)]
pub trait Observer: Send + Sync + 'static {
    /// The handler table.
    fn handlers(self: &Arc<Self>) -> Vec<Handler>;
}

/// The registrations made by attaching an observer.
#[derive(Debug, Clone)]
pub struct Attached {
    subscriptions: Vec<Subscription>,
}

impl Attached {
    pub(crate) fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    /// Every registration, in handler-table order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Registration handles, in handler-table order.
    pub fn ids(&self) -> impl Iterator<Item = SubscriptionId> + '_ {
        self.subscriptions.iter().map(|s| s.id)
    }

    /// Outcomes of every held event replayed while attaching.
    pub fn replayed(&self) -> impl Iterator<Item = &ReplayOutcome> {
        self.subscriptions.iter().flat_map(|s| s.replayed.iter())
    }
}
