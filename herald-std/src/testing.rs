//! Testing utilities for Herald.
//!
//! This module provides utilities to make testing listeners and
//! orchestrators easier.
//!
//! # Features
//!
//! - [`RecordingListener`]: A listener that records every event it receives and
//!   can be programmed to return a value or fail
//! - [`CountingListener`]: A listener that counts invocations
//! - [`CallLog`]: Labelled listeners sharing one log, for asserting firing order
//! - [`ManualClock`]: A clock that only moves when told to

use herald_core::{Clock, Event, Listener, ListenerRef, ListenerResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records events and can be programmed to return specific results.
///
/// Clones share their recording, so keep one clone for assertions and
/// subscribe another.
///
/// # Example
///
/// ```rust
/// use herald_core::{Event, Listener};
/// use herald_std::testing::RecordingListener;
/// use serde_json::json;
///
/// let spy = RecordingListener::new();
/// spy.set_output(Some(json!("done")));
///
/// let mut event = Event::named("job");
/// assert_eq!(spy.on_event(&mut event).unwrap(), Some(json!("done")));
/// assert_eq!(spy.identities(), ["job"]);
/// ```
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<Event>>>,
    output: Arc<Mutex<Option<Value>>>,
    error: Arc<Mutex<Option<String>>>,
}

impl RecordingListener {
    /// Create a new recording listener that returns `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recording listener that returns `value` on every call.
    pub fn returning(value: Value) -> Self {
        let listener = Self::new();
        listener.set_output(Some(value));
        listener
    }

    /// Set the value to return.
    pub fn set_output(&self, output: Option<Value>) {
        *self.output.lock() = output;
    }

    /// Make every following call fail with `message`.
    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock() = Some(message.into());
    }

    /// Clear the error state.
    pub fn clear_error(&self) {
        *self.error.lock() = None;
    }

    /// A handle for subscribing this recorder.
    pub fn to_ref(&self) -> ListenerRef {
        ListenerRef::new(self.clone())
    }

    /// Snapshots of the received events, as they were on arrival.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Identities of the received events.
    pub fn identities(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.identity().to_owned())
            .collect()
    }

    /// Number of calls so far.
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Listener for RecordingListener {
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        self.events.lock().push(event.clone());

        if let Some(message) = self.error.lock().clone() {
            return Err(message.into());
        }

        Ok(self.output.lock().clone())
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts invocations.
#[derive(Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a new counting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for subscribing this counter.
    pub fn to_ref(&self) -> ListenerRef {
        ListenerRef::new(self.clone())
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Listener for CountingListener {
    fn on_event(&self, _event: &mut Event) -> ListenerResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// A shared log of labelled listener invocations.
///
/// # Example
///
/// ```rust
/// use herald_core::Event;
/// use herald_std::testing::CallLog;
///
/// let log = CallLog::new();
/// let first = log.listener("first");
/// let second = log.listener("second");
///
/// let mut event = Event::named("e");
/// second.on_event(&mut event).unwrap();
/// first.on_event(&mut event).unwrap();
/// assert_eq!(log.entries(), ["second", "first"]);
/// ```
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener appending `label` to the log.
    pub fn listener(&self, label: impl Into<String>) -> ListenerRef {
        let entries = Arc::clone(&self.entries);
        let label = label.into();
        ListenerRef::from_fn(move |_| {
            entries.lock().push(label.clone());
            Ok(None)
        })
    }

    /// Append an entry directly.
    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    /// Labels in invocation order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

/// A [`Clock`] that starts at zero and only moves through [`ManualClock::advance`].
///
/// Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
