//! Logging listener for event observation.

use herald_core::{Event, Listener, ListenerResult};

/// A listener that logs every event it receives at debug level.
///
/// Subscribe it under `all` to trace everything published through an
/// orchestrator.
///
/// # Example
///
/// ```rust
/// use herald_core::{Event, Listener};
/// use herald_std::listeners::LoggingListener;
///
/// let logging = LoggingListener::named("audit");
/// let mut event = Event::named("signup");
/// assert_eq!(logging.on_event(&mut event).unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingListener {
    name: &'static str,
}

impl LoggingListener {
    /// Create a `LoggingListener` with a default name.
    pub fn new() -> Self {
        Self { name: "herald" }
    }

    /// Create a `LoggingListener` whose log lines carry `name`.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for LoggingListener {
    fn on_event(&self, event: &mut Event) -> ListenerResult {
        tracing::debug!(
            name = %self.name,
            identity = %event.identity(),
            payload = ?event.payload(),
            cancelled = event.is_cancelled(),
            "Observed event"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_logging_listener_leaves_event_untouched() {
        let listener = LoggingListener::new();
        let mut event = Event::hook("create").with("x", json!(1));

        assert_eq!(listener.on_event(&mut event).unwrap(), None);
        assert_eq!(event.get("x"), Some(&json!(1)));
        assert!(event.results().is_empty());
    }
}
