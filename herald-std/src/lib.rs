//! # herald-std
//!
//! Standard implementations for the Herald publish/subscribe engine.
//!
//! This crate provides:
//! - **Registry**: [`Registry`], priority-ordered listener buckets keyed by identity
//! - **Resolution**: [`ListenerProvider`], [`CompositeProvider`] and [`lookup_order`]
//! - **Holding**: [`HeldQueue`], unheard events waiting for a subscriber
//! - **Construction**: [`KindFactory`], a map-backed event factory
//! - **Standard listeners**: Logging
//! - **Testing**: recorders, counters and a manual clock

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use herald_core;

// Modules
pub mod factory;
pub mod held;
pub mod listeners;
pub mod registry;
pub mod resolver;
pub mod testing;

pub use factory::KindFactory;
pub use held::HeldQueue;
pub use registry::{
    ListenerEntry, Registry, SubscribeOptions, SubscriptionId, Unsubscribe, validate_identity,
};
pub use resolver::{CompositeProvider, ListenerProvider, lookup_order};
