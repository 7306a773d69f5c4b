//! # herald-core
//!
//! Core types for the Herald publish/subscribe engine.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that defines events or listeners without needing the registry and
//! orchestrator from `herald-std` and `herald`.
//!
//! # Building Blocks
//!
//! ## Events ([`Event`])
//!
//! A value object with an optional explicit name, a type-side identity
//! ([`EventKind`]), an ordered payload and a set of [`EventFlags`]. Chained
//! events ("hooks") also collect listener return values on a result stack.
//!
//! ## Listeners ([`Listener`])
//!
//! Anything callable with `&mut Event`. Closures qualify directly; shared
//! objects expose methods through [`ListenerRef::method`]. Listeners compose
//! with [`Listener::filter`] and [`Listener::map`].
//!
//! ## Dispatchers ([`Dispatcher`])
//!
//! The publish seam. Events are bound to the dispatcher they travel through,
//! which lets listeners publish follow-up events.
//!
//! ## Priorities ([`Priority`])
//!
//! Six ordered tiers; lower tiers fire first.
//!
//! # Error Types
//!
//! - [`HeraldError`] - Top-level error type
//! - [`SubscribeError`] - Rejected registrations
//! - [`DispatchError`] - Publish failures
//! - [`FactoryError`] - Event construction failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod clock;
mod dispatcher;
mod error;
mod event;
mod factory;
pub mod kind;
mod listener;
mod priority;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use dispatcher::Dispatcher;
pub use error::{
    BoxError, DispatchError, FactoryError, HeraldError, InvalidSubscription, SharedError,
    SubscribeError,
};
pub use event::{Event, EventFlags, Payload};
pub use factory::EventFactory;
pub use kind::{EventKind, Kind};
pub use listener::{Descriptor, Filter, Listener, ListenerRef, ListenerResult, Map};
pub use priority::Priority;
pub use serde_json::Value;
