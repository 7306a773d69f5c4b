//! # herald - In-Process Publish/Subscribe Engine
//!
//! `herald` dispatches events to listeners registered against event
//! identities. Listeners fire in priority order, can stop propagation,
//! cancel events and chain return values; events nobody listens to can be
//! held until a matching listener subscribes.
//!
//! ## Quick Start
//!
//! ```rust
//! use herald::prelude::*;
//! use serde_json::json;
//!
//! #[derive(EventKind)]
//! #[event(type_name = "user.created", extends("user.changed"), implements("auditable"))]
//! struct UserCreated;
//!
//! let orchestrator = Orchestrator::builder().hold_unheard(true).build();
//!
//! // Nobody listens yet: the event is held.
//! orchestrator.publish(Event::of::<UserCreated>().with("id", json!(7))).unwrap();
//! assert_eq!(orchestrator.held_len(), 1);
//!
//! // Subscribing to an ancestor replays it.
//! let subscription = orchestrator
//!     .on("user.changed", |event: &mut Event| Ok(event.get("id").cloned()))
//!     .unwrap();
//! assert_eq!(subscription.replayed.len(), 1);
//! assert_eq!(orchestrator.held_len(), 0);
//! ```
//!
//! ## Resolution order
//!
//! For every event, buckets are visited as: `all`, explicit name, concrete
//! type, ancestors, capabilities, `any`. Within a bucket, lower priority
//! tiers fire first and equal tiers fire in registration order.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

extern crate self as herald;

mod config;
mod observer;
mod orchestrator;

pub use config::DispatchConfig;
pub use observer::{Attached, Handler, Observer};
pub use orchestrator::{
    Orchestrator, OrchestratorBuilder, ReplayOutcome, Subscription, WeakOrchestrator,
};

pub use herald_core::{
    BoxError, Clock, Descriptor, DispatchError, Dispatcher, Event, EventFactory, EventFlags,
    EventKind, FactoryError, HeraldError, InvalidSubscription, Kind, Listener, ListenerRef,
    ListenerResult, Payload, Priority, SharedError, SubscribeError, SystemClock, Value, kind,
};
pub use herald_std::{
    CompositeProvider, HeldQueue, KindFactory, ListenerEntry, ListenerProvider, Registry,
    SubscribeOptions, SubscriptionId, Unsubscribe, lookup_order,
};

/// Standard listener implementations.
pub mod listeners {
    pub use herald_std::listeners::LoggingListener;
}

/// Testing utilities.
pub mod testing {
    pub use herald_std::testing::{CallLog, CountingListener, ManualClock, RecordingListener};
}

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, DispatchError, Dispatcher, Event, EventKind, Handler, Kind, Listener,
        ListenerRef, ListenerResult, Observer, Orchestrator, Priority, SubscribeOptions,
        Unsubscribe,
    };
}

#[cfg(feature = "macros")]
pub use herald_macros::EventKind;
