//! Builder for [`Orchestrator`].

use super::Orchestrator;
use crate::config::DispatchConfig;
use herald_core::{Clock, SystemClock};
use herald_std::{CompositeProvider, ListenerProvider};
use std::sync::Arc;

/// Builder for constructing an [`Orchestrator`].
///
/// # Example
///
/// ```rust
/// use herald::Orchestrator;
///
/// let orchestrator = Orchestrator::builder()
///     .hold_unheard(true)
///     .error_event("failure")
///     .build();
///
/// assert!(orchestrator.is_holding());
/// assert_eq!(orchestrator.config().error_event, "failure");
/// ```
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: DispatchConfig,
    clock: Option<Arc<dyn Clock>>,
    providers: CompositeProvider,
}

impl OrchestratorBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Hold events nobody listens to.
    pub fn hold_unheard(mut self, hold: bool) -> Self {
        self.config.hold_unheard = hold;
        self
    }

    /// Identity of the events published when a listener fails.
    pub fn error_event(mut self, identity: impl Into<String>) -> Self {
        self.config.error_event = identity.into();
        self
    }

    /// Publish error events when listeners fail.
    pub fn recover_errors(mut self, recover: bool) -> Self {
        self.config.recover_errors = recover;
        self
    }

    /// Schedule timers against `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Consult `provider` after the orchestrator's own registry.
    ///
    /// Providers are read-only from the orchestrator's side; their entries
    /// are never held against or removed.
    pub fn provider(mut self, provider: Arc<dyn ListenerProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Orchestrator {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        Orchestrator::from_parts(self.config, clock, self.providers)
    }
}
