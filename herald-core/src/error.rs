//! Error types for Herald.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HeraldError`] - Top-level error type for all Herald operations
//! - [`SubscribeError`] - Malformed registrations, rejected before the registry changes
//! - [`DispatchError`] - Errors surfacing from a publish call
//! - [`FactoryError`] - Errors from [`EventFactory`](crate::EventFactory) implementations

use std::sync::Arc;
use thiserror::Error;

/// A boxed error type returned by listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A listener error once it has been caught by a dispatcher.
///
/// The same value is handed to error listeners and returned to the publisher.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Herald operations.
#[derive(Error, Debug)]
pub enum HeraldError {
    /// A subscription was rejected.
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    /// A publish call failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// An event could not be constructed.
    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while registering a listener.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// The registration arguments were malformed.
    #[error("invalid subscription: {0}")]
    InvalidSubscription(#[from] InvalidSubscription),

    /// No event identity could be determined for a type-based registration.
    #[error("cannot determine an event identity for listener `{0}`")]
    InvalidListenerSignature(String),
}

/// The reason a subscription was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSubscription {
    /// The event identity was an empty string.
    #[error("event identity is empty")]
    EmptyIdentity,

    /// The identity is reserved (for example the `*` wildcard).
    #[error("`{0}` is reserved and cannot be subscribed to")]
    ReservedIdentity(String),

    /// A timer interval shorter than one millisecond.
    #[error("timer interval must be at least one millisecond")]
    ZeroInterval,

    /// A raw priority tier outside `0..=5`.
    #[error("priority tier {0} is outside the six tiers")]
    PriorityOutOfRange(u8),
}

/// Errors surfacing from a publish call.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// A listener failed while handling the event.
    #[error("listener for `{identity}` failed: {source}")]
    Listener {
        /// Identity of the event being dispatched when the listener failed.
        identity: String,
        /// The error raised by the listener.
        #[source]
        source: SharedError,
    },

    /// The event is already bound to a different dispatcher.
    #[error("event `{identity}` is already bound to another dispatcher")]
    DoubleAttach {
        /// Identity of the rejected event.
        identity: String,
    },
}

impl DispatchError {
    /// The listener error, if this is a listener failure.
    pub fn listener_error(&self) -> Option<&SharedError> {
        match self {
            DispatchError::Listener { source, .. } => Some(source),
            DispatchError::DoubleAttach { .. } => None,
        }
    }
}

/// Errors that can occur while constructing events.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// No constructor was registered for the requested type.
    #[error("no event type registered as `{0}`")]
    UnknownType(String),

    /// The constructor itself failed.
    #[error("failed to build `{type_id}`: {source}")]
    Build {
        /// The requested type identifier.
        type_id: String,
        /// The constructor's error.
        #[source]
        source: BoxError,
    },
}

impl From<BoxError> for HeraldError {
    fn from(err: BoxError) -> Self {
        HeraldError::Custom(err)
    }
}

impl From<InvalidSubscription> for HeraldError {
    fn from(err: InvalidSubscription) -> Self {
        HeraldError::Subscribe(err.into())
    }
}
