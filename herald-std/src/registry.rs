//! Priority-ordered listener registry.
//!
//! Listeners are stored per event identity in a single ordered `Vec`. Within
//! a bucket, entries are ordered by [`Priority`] tier and, inside a tier, by
//! registration order. Insertion finds the end of its tier with a binary
//! search, so the bucket is never re-sorted.

use herald_core::{
    Clock, Event, InvalidSubscription, ListenerRef, ListenerResult, Priority, SystemClock, kind,
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

// ============================================================================
// SubscribeOptions
// ============================================================================

/// How a listener is registered.
///
/// # Example
///
/// ```rust
/// use herald_std::SubscribeOptions;
/// use herald_core::Priority;
/// use std::time::Duration;
///
/// let options = SubscribeOptions::new()
///     .priority(Priority::High)
///     .forced()
///     .every(Duration::from_secs(5));
///
/// assert!(options.is_timer());
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Firing tier. Defaults to [`Priority::Normal`].
    pub priority: Priority,
    /// Run even when the event has been cancelled.
    pub forced: bool,
    /// Timer interval. `None` registers an ordinary listener.
    pub interval: Option<Duration>,
}

impl SubscribeOptions {
    /// Default options: normal priority, not forced, not a timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the priority tier.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Run even when the event has been cancelled.
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Make this a timer listener firing at most once per `interval`.
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Whether these options register a timer listener.
    pub fn is_timer(&self) -> bool {
        self.interval.is_some()
    }

    /// Reject intervals that round down to zero milliseconds.
    pub fn validate(&self) -> Result<(), InvalidSubscription> {
        match self.interval {
            Some(interval) if interval.as_millis() == 0 => Err(InvalidSubscription::ZeroInterval),
            _ => Ok(()),
        }
    }
}

/// Check that `identity` can be subscribed to.
pub fn validate_identity(identity: &str) -> Result<(), InvalidSubscription> {
    if identity.is_empty() {
        Err(InvalidSubscription::EmptyIdentity)
    } else if identity == kind::WILDCARD {
        Err(InvalidSubscription::ReservedIdentity(identity.to_owned()))
    } else {
        Ok(())
    }
}

/// Handle of a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// ListenerEntry
// ============================================================================

/// A registered listener together with its registration metadata.
///
/// Entries are shared between the registry and dispatch snapshots, so a
/// timer's next firing time is tracked atomically.
pub struct ListenerEntry {
    id: SubscriptionId,
    listener: ListenerRef,
    priority: Priority,
    forced: bool,
    interval: Option<Duration>,
    next_fire: AtomicU64,
}

impl ListenerEntry {
    fn new(id: SubscriptionId, listener: ListenerRef, options: SubscribeOptions, now: u64) -> Self {
        let next_fire = options
            .interval
            .map_or(0, |interval| now.saturating_add(millis(interval)));
        Self {
            id,
            listener,
            priority: options.priority,
            forced: options.forced,
            interval: options.interval,
            next_fire: AtomicU64::new(next_fire),
        }
    }

    /// The registration handle.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The listener.
    pub fn listener(&self) -> &ListenerRef {
        &self.listener
    }

    /// The firing tier.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether the entry runs on cancelled events.
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// The timer interval, if this is a timer entry.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Whether this is a timer entry.
    pub fn is_timer(&self) -> bool {
        self.interval.is_some()
    }

    /// Clock reading at which a timer entry next becomes due.
    pub fn next_fire(&self) -> Option<u64> {
        self.interval
            .map(|_| self.next_fire.load(Ordering::Acquire))
    }

    /// Claim a firing at clock reading `now`.
    ///
    /// Ordinary entries always fire. A timer entry fires only once `now`
    /// reaches its next firing time, which then advances by exactly one
    /// interval.
    pub fn try_fire(&self, now: u64) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        let step = millis(interval);
        let mut due = self.next_fire.load(Ordering::Acquire);
        loop {
            if now < due {
                return false;
            }
            match self.next_fire.compare_exchange_weak(
                due,
                due.saturating_add(step),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => due = actual,
            }
        }
    }

    /// Invoke the listener.
    pub fn invoke(&self, event: &mut Event) -> ListenerResult {
        self.listener.on_event(event)
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("forced", &self.forced)
            .field("interval", &self.interval)
            .field("next_fire", &self.next_fire())
            .finish_non_exhaustive()
    }
}

fn millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Unsubscribe
// ============================================================================

/// What to remove from a bucket.
#[derive(Debug, Clone)]
pub enum Unsubscribe {
    /// The first registration of this listener.
    Listener(ListenerRef),
    /// The first timer registration of this listener with this interval.
    Timer(ListenerRef, Duration),
    /// The registration with this handle.
    Subscription(SubscriptionId),
    /// Every registration under the identity.
    All,
}

impl Unsubscribe {
    fn matches(&self, entry: &ListenerEntry) -> bool {
        match self {
            Unsubscribe::Listener(listener) => entry.listener.matches(listener),
            Unsubscribe::Timer(listener, interval) => {
                entry.interval == Some(*interval) && entry.listener.matches(listener)
            }
            Unsubscribe::Subscription(id) => entry.id == *id,
            Unsubscribe::All => true,
        }
    }
}

impl From<ListenerRef> for Unsubscribe {
    fn from(listener: ListenerRef) -> Self {
        Unsubscribe::Listener(listener)
    }
}

impl From<&ListenerRef> for Unsubscribe {
    fn from(listener: &ListenerRef) -> Self {
        Unsubscribe::Listener(listener.clone())
    }
}

impl From<SubscriptionId> for Unsubscribe {
    fn from(id: SubscriptionId) -> Self {
        Unsubscribe::Subscription(id)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Listener buckets keyed by event identity.
pub struct Registry {
    buckets: HashMap<String, Vec<Arc<ListenerEntry>>>,
    clock: Arc<dyn Clock>,
    next_id: u64,
}

impl Registry {
    /// Create an empty registry using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create an empty registry whose timers read `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: HashMap::new(),
            clock,
            next_id: 0,
        }
    }

    /// The clock timer entries are scheduled against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Register `listener` under `identity`.
    ///
    /// The entry is placed after every entry of the same or a higher tier.
    /// Nothing changes when the registration is rejected.
    pub fn add(
        &mut self,
        identity: &str,
        listener: ListenerRef,
        options: SubscribeOptions,
    ) -> Result<SubscriptionId, InvalidSubscription> {
        validate_identity(identity)?;
        options.validate()?;

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let entry = Arc::new(ListenerEntry::new(
            id,
            listener,
            options,
            self.clock.now_millis(),
        ));

        let bucket = self.buckets.entry(identity.to_owned()).or_default();
        let at = bucket.partition_point(|e| e.priority <= options.priority);
        bucket.insert(at, entry);
        Ok(id)
    }

    /// Remove registrations under `identity` matching `target`.
    ///
    /// Returns the number of entries removed. An unknown identity or target
    /// removes nothing. Only [`Unsubscribe::All`] removes more than one entry;
    /// nothing is ever registered under `*`, so a specific target under `*`
    /// matches nothing.
    pub fn remove(&mut self, identity: &str, target: impl Into<Unsubscribe>) -> usize {
        let target = target.into();
        if matches!(target, Unsubscribe::All) {
            return self.remove_all(identity);
        }

        let Some(bucket) = self.buckets.get_mut(identity) else {
            return 0;
        };
        let Some(at) = bucket.iter().position(|e| target.matches(e)) else {
            return 0;
        };
        bucket.remove(at);
        if bucket.is_empty() {
            self.buckets.remove(identity);
        }
        1
    }

    /// Remove every registration under `identity`; `*` clears the registry.
    pub fn remove_all(&mut self, identity: &str) -> usize {
        if identity == kind::WILDCARD {
            let removed = self.len();
            self.buckets.clear();
            return removed;
        }
        self.buckets.remove(identity).map_or(0, |bucket| bucket.len())
    }

    /// Whether anything is registered under `identity`.
    pub fn has_subscribers(&self, identity: &str) -> bool {
        self.buckets.contains_key(identity)
    }

    /// Index of the first registration of `listener` under `identity`.
    pub fn position(&self, identity: &str, listener: &ListenerRef) -> Option<usize> {
        self.bucket(identity)
            .iter()
            .position(|e| e.listener.matches(listener))
    }

    /// The ordered entries under `identity`.
    pub fn bucket(&self, identity: &str) -> &[Arc<ListenerEntry>] {
        self.buckets.get(identity).map_or(&[], Vec::as_slice)
    }

    /// Identities with at least one registration.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("buckets", &self.buckets)
            .finish_non_exhaustive()
    }
}
