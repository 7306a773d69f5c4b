//! The dispatch orchestrator.
//!
//! An [`Orchestrator`] owns a [`Registry`], a [`HeldQueue`] and any number of
//! extra [`ListenerProvider`]s. Publishing an event runs one dispatch pass:
//!
//! 1. bind the event to this orchestrator,
//! 2. snapshot the candidate entries (no lock is held afterwards),
//! 3. invoke candidates in order, honouring propagation stop, cancellation,
//!    forced entries and timer intervals,
//! 4. hold the event when nothing matched and holding is enabled.
//!
//! A failing listener ends the pass. Unless the event already represents an
//! error, a derived error event is dispatched once before the failure is
//! returned to the publisher.

mod builder;

pub use builder::OrchestratorBuilder;

use crate::{
    config::DispatchConfig,
    observer::{Attached, Observer},
};
use herald_core::{
    BoxError, Clock, DispatchError, Dispatcher, Event, EventKind, Kind, ListenerRef,
    ListenerResult, SharedError, SubscribeError,
};
use herald_std::{
    CompositeProvider, HeldQueue, ListenerEntry, ListenerProvider, Registry, SubscribeOptions,
    SubscriptionId, Unsubscribe, validate_identity,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::{
    fmt,
    sync::{Arc, Weak},
};
use tracing::{debug, trace, warn};

/// Outcome of replaying one held event.
pub type ReplayOutcome = Result<Option<Value>, DispatchError>;

/// A registration made through [`Orchestrator::subscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Handle of the registration.
    pub id: SubscriptionId,
    /// Identity the listener was registered under.
    pub identity: String,
    /// Outcomes of the held events replayed by this subscription, oldest first.
    pub replayed: Vec<ReplayOutcome>,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// An in-process event dispatcher.
///
/// Cloning is cheap; clones share registrations and held events.
///
/// # Example
///
/// ```rust
/// use herald::{Event, Orchestrator, Priority, SubscribeOptions};
/// use serde_json::json;
///
/// let orchestrator = Orchestrator::new();
///
/// orchestrator
///     .on("create", |event: &mut Event| {
///         let previous = event.result().and_then(|v| v.as_i64()).unwrap_or(0);
///         Ok(Some(json!(previous + 1)))
///     })
///     .unwrap();
/// orchestrator
///     .subscribe(
///         "create",
///         herald::ListenerRef::from_fn(|_| Ok(Some(json!(10)))),
///         SubscribeOptions::new().priority(Priority::High),
///     )
///     .unwrap();
///
/// let result = orchestrator.publish(Event::hook("create")).unwrap();
/// assert_eq!(result, Some(json!(11)));
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

/// A non-owning handle to an [`Orchestrator`].
///
/// Listeners that need to subscribe or unsubscribe during dispatch capture
/// this instead of the orchestrator itself.
#[derive(Clone)]
pub struct WeakOrchestrator {
    inner: Weak<Inner>,
}

impl WeakOrchestrator {
    /// The orchestrator, if it is still alive.
    pub fn upgrade(&self) -> Option<Orchestrator> {
        self.inner.upgrade().map(|inner| Orchestrator { inner })
    }
}

struct Inner {
    this: Weak<Inner>,
    registry: RwLock<Registry>,
    held: Mutex<HeldQueue>,
    providers: CompositeProvider,
    clock: Arc<dyn Clock>,
    config: DispatchConfig,
}

impl Orchestrator {
    /// Create an orchestrator with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub(crate) fn from_parts(
        config: DispatchConfig,
        clock: Arc<dyn Clock>,
        providers: CompositeProvider,
    ) -> Self {
        let inner = Arc::new_cyclic(|this| Inner {
            this: this.clone(),
            registry: RwLock::new(Registry::with_clock(Arc::clone(&clock))),
            held: Mutex::new(HeldQueue::new(config.hold_unheard)),
            providers,
            clock,
            config,
        });
        Self { inner }
    }

    /// A handle that does not keep the orchestrator alive.
    pub fn downgrade(&self) -> WeakOrchestrator {
        WeakOrchestrator {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    /// The clock timers are scheduled against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Register `listener` under `identity`.
    ///
    /// Unless the listener is a timer, held events reachable under
    /// `identity` are replayed right away, oldest first. A failed replay does
    /// not undo the registration; its error is reported in
    /// [`Subscription::replayed`].
    pub fn subscribe(
        &self,
        identity: &str,
        listener: ListenerRef,
        options: SubscribeOptions,
    ) -> Result<Subscription, SubscribeError> {
        let id = self.inner.registry.write().add(identity, listener, options)?;
        debug!(%identity, %id, priority = ?options.priority, forced = options.forced, "Subscribed listener");

        let replayed = if options.is_timer() {
            Vec::new()
        } else {
            self.replay(identity)
        };

        Ok(Subscription {
            id,
            identity: identity.to_owned(),
            replayed,
        })
    }

    /// Register a closure under `identity` with default options.
    pub fn on<F>(&self, identity: &str, listener: F) -> Result<Subscription, SubscribeError>
    where
        F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.subscribe(identity, ListenerRef::from_fn(listener), SubscribeOptions::new())
    }

    /// Register `listener` under the type identity of each kind.
    ///
    /// Every kind is checked before anything is registered.
    pub fn subscribe_kinds(
        &self,
        kinds: &[EventKind],
        listener: ListenerRef,
        options: SubscribeOptions,
    ) -> Result<Vec<Subscription>, SubscribeError> {
        if kinds.is_empty() || kinds.iter().any(|k| k.type_name().is_empty()) {
            return Err(SubscribeError::InvalidListenerSignature(listener_label(
                &listener,
            )));
        }
        for kind in kinds {
            validate_identity(kind.type_name())?;
        }
        options.validate()?;

        kinds
            .iter()
            .map(|kind| self.subscribe(kind.type_name(), listener.clone(), options))
            .collect()
    }

    /// Register `listener` under the type identity of `K`.
    pub fn subscribe_kind<K: Kind>(
        &self,
        listener: ListenerRef,
        options: SubscribeOptions,
    ) -> Result<Subscription, SubscribeError> {
        let mut subscriptions = self.subscribe_kinds(&[K::kind()], listener, options)?;
        subscriptions
            .pop()
            .ok_or_else(|| SubscribeError::InvalidListenerSignature(K::kind().type_name().to_owned()))
    }

    /// Remove registrations under `identity` matching `target`.
    ///
    /// Returns how many registrations were removed; unknown targets remove
    /// nothing. [`Unsubscribe::All`] removes everything under the identity,
    /// and everything at all under `*`. Any other target under `*` removes
    /// nothing.
    pub fn unsubscribe(&self, identity: &str, target: impl Into<Unsubscribe>) -> usize {
        let removed = self.inner.registry.write().remove(identity, target);
        debug!(%identity, removed, "Unsubscribed");
        removed
    }

    /// Remove every registration under `identity`; `*` clears everything.
    pub fn unsubscribe_all(&self, identity: &str) -> usize {
        self.unsubscribe(identity, Unsubscribe::All)
    }

    /// Whether anything is registered under `identity`.
    pub fn has_subscribers(&self, identity: &str) -> bool {
        self.inner.registry.read().has_subscribers(identity)
    }

    /// Position of the first registration of `listener` under `identity`.
    pub fn is_subscribed(&self, identity: &str, listener: &ListenerRef) -> Option<usize> {
        self.inner.registry.read().position(identity, listener)
    }

    /// Total number of registrations.
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Subscribe every handler an observer declares.
    ///
    /// All handlers are checked before anything is registered.
    pub fn attach<O: Observer>(&self, observer: &Arc<O>) -> Result<Attached, SubscribeError> {
        let handlers = observer.handlers();
        for handler in &handlers {
            validate_identity(&handler.identity)?;
            handler.options.validate()?;
        }

        let subscriptions = handlers
            .into_iter()
            .map(|h| self.subscribe(&h.identity, h.listener, h.options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Attached::new(subscriptions))
    }

    /// Remove exactly the registrations made by [`Orchestrator::attach`].
    pub fn detach(&self, attached: &Attached) -> usize {
        attached
            .subscriptions()
            .iter()
            .map(|s| self.unsubscribe(&s.identity, s.id))
            .sum()
    }

    // ------------------------------------------------------------------------
    // Holding
    // ------------------------------------------------------------------------

    /// Enable or disable holding of unheard events.
    ///
    /// Disabling discards every held event without invoking anything and
    /// returns how many were dropped.
    pub fn set_holding(&self, holding: bool) -> usize {
        let dropped = self.inner.held.lock().set_holding(holding);
        debug!(holding, dropped, "Holding changed");
        dropped
    }

    /// Whether unheard events are held.
    pub fn is_holding(&self) -> bool {
        self.inner.held.lock().is_holding()
    }

    /// Number of held events.
    pub fn held_len(&self) -> usize {
        self.inner.held.lock().len()
    }

    fn replay(&self, identity: &str) -> Vec<ReplayOutcome> {
        let events = self.inner.held.lock().take_matching(identity);
        if !events.is_empty() {
            debug!(%identity, count = events.len(), "Replaying held events");
        }
        events
            .into_iter()
            .map(|event| self.inner.publish(event))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------------

    /// Publish an owned event and return the latest chained result.
    pub fn publish(&self, event: Event) -> Result<Option<Value>, DispatchError> {
        self.inner.publish(event)
    }

    /// Dispatch a borrowed event. The event is never held.
    pub fn dispatch(&self, event: &mut Event) -> Result<Option<Value>, DispatchError> {
        self.inner.dispatch(event)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for Orchestrator {
    fn publish(&self, event: Event) -> Result<Option<Value>, DispatchError> {
        self.inner.publish(event)
    }

    fn dispatch(&self, event: &mut Event) -> Result<Option<Value>, DispatchError> {
        self.inner.dispatch(event)
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.inner.config)
            .field("subscriptions", &self.subscription_count())
            .field("held", &self.held_len())
            .finish_non_exhaustive()
    }
}

fn listener_label(listener: &ListenerRef) -> String {
    match listener.descriptor() {
        herald_core::Descriptor::Method { key, .. } => key.to_owned(),
        herald_core::Descriptor::Anonymous => "<anonymous>".to_owned(),
    }
}

// ============================================================================
// Dispatch pass
// ============================================================================

enum Pass {
    Unheard,
    Heard(Option<Value>),
}

impl Inner {
    fn run(&self, event: &mut Event) -> Result<Pass, DispatchError> {
        let dispatcher: Weak<dyn Dispatcher> = self.this.clone();
        event.bind(dispatcher)?;
        event.clear_results();
        event.resume_propagation();

        let mut candidates: Vec<Arc<ListenerEntry>> = self.registry.resolve(event);
        self.providers.resolve_into(event, &mut candidates);

        if candidates.is_empty() {
            trace!(identity = %event.identity(), "No listeners");
            return Ok(Pass::Unheard);
        }

        let now = self.clock.now_millis();
        for entry in &candidates {
            if event.is_propagation_stopped() {
                trace!(identity = %event.identity(), "Propagation stopped");
                break;
            }
            if event.is_cancelled() && !entry.is_forced() {
                continue;
            }
            if !entry.try_fire(now) {
                continue;
            }

            trace!(identity = %event.identity(), id = %entry.id(), "Invoking listener");
            match entry.invoke(event) {
                Ok(Some(value)) if event.is_chained() => event.push_result(value),
                Ok(_) => {}
                Err(err) => return Err(self.recover(event, err)),
            }
        }

        Ok(Pass::Heard(event.result().cloned()))
    }

    fn recover(&self, event: &Event, err: BoxError) -> DispatchError {
        let source: SharedError = Arc::from(err);
        warn!(identity = %event.identity(), error = %source, "Listener failed");

        if self.config.recover_errors && !event.is_error() {
            let mut error_event =
                Event::from_error(self.config.error_event.clone(), Arc::clone(&source), event);
            if let Err(nested) = self.dispatch(&mut error_event) {
                warn!(identity = %event.identity(), error = %nested, "Error listener failed");
            }
        }

        DispatchError::Listener {
            identity: event.identity().to_owned(),
            source,
        }
    }
}

impl Dispatcher for Inner {
    fn publish(&self, mut event: Event) -> Result<Option<Value>, DispatchError> {
        debug!(identity = %event.identity(), "Publishing event");
        match self.run(&mut event)? {
            Pass::Heard(result) => Ok(result),
            Pass::Unheard => {
                if self.held.lock().try_hold(event).is_none() {
                    debug!("Held unheard event");
                }
                Ok(None)
            }
        }
    }

    fn dispatch(&self, event: &mut Event) -> Result<Option<Value>, DispatchError> {
        debug!(identity = %event.identity(), "Dispatching event");
        match self.run(event)? {
            Pass::Heard(result) => Ok(result),
            Pass::Unheard => Ok(None),
        }
    }
}
