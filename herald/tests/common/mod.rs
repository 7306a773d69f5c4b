#![allow(dead_code)]

use herald::{Event, EventKind, ListenerRef, ListenerResult, Orchestrator, testing::ManualClock};
use serde_json::{Value, json};
use std::sync::Arc;

// ============================================================================
// Tracing
// ============================================================================

/// Install a test subscriber once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Event Types
// ============================================================================

pub fn user_created() -> Event {
    Event::new(
        EventKind::new("user.created")
            .with_ancestor("user.changed")
            .with_capability("auditable"),
    )
}

// ============================================================================
// Orchestrators
// ============================================================================

pub fn holding_orchestrator() -> Orchestrator {
    init_tracing();
    Orchestrator::builder().hold_unheard(true).build()
}

pub fn clocked_orchestrator() -> (Orchestrator, ManualClock) {
    init_tracing();
    let clock = ManualClock::new();
    let orchestrator = Orchestrator::builder()
        .clock(Arc::new(clock.clone()))
        .build();
    (orchestrator, clock)
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Returns the previous chained result with `suffix` appended.
pub fn appender(suffix: &'static str) -> ListenerRef {
    ListenerRef::from_fn(move |event: &mut Event| -> ListenerResult {
        let previous = event.result().and_then(Value::as_str).unwrap_or("");
        Ok(Some(json!(format!("{previous}{suffix}"))))
    })
}

/// Always fails with `message`.
pub fn failing(message: &'static str) -> ListenerRef {
    ListenerRef::from_fn(move |_| Err(message.into()))
}
