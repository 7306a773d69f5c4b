mod common;

use common::{holding_orchestrator, init_tracing};
use herald::{
    Event, Handler, ListenerRef, ListenerResult, Observer, Orchestrator, Priority,
    SubscribeOptions,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

#[derive(Default)]
struct Mailer {
    sent: Mutex<Vec<String>>,
}

impl Mailer {
    fn on_signup(&self, event: &mut Event) -> ListenerResult {
        self.sent.lock().push(format!("welcome {}", event.get("user").cloned().unwrap_or_default()));
        Ok(None)
    }

    fn on_any(&self, event: &mut Event) -> ListenerResult {
        self.sent.lock().push(format!("audit {}", event.identity()));
        Ok(None)
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

impl Observer for Mailer {
    fn handlers(self: &Arc<Self>) -> Vec<Handler> {
        vec![
            Handler::new("signup", ListenerRef::method(self, "on_signup", Mailer::on_signup))
                .with_options(SubscribeOptions::new().priority(Priority::High)),
            Handler::new("any", ListenerRef::method(self, "on_any", Mailer::on_any)),
        ]
    }
}

#[test]
fn test_attach_and_detach_observer() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let mailer = Arc::new(Mailer::default());

    let attached = orchestrator.attach(&mailer).unwrap();
    assert_eq!(attached.ids().count(), 2);

    orchestrator
        .publish(Event::named("signup").with("user", json!("ada")))
        .unwrap();
    assert_eq!(mailer.sent(), ["welcome \"ada\"", "audit signup"]);

    assert_eq!(orchestrator.detach(&attached), 2);
    assert_eq!(orchestrator.subscription_count(), 0);
    assert_eq!(orchestrator.detach(&attached), 0);
}

#[test]
fn test_detach_leaves_other_registrations() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let mailer = Arc::new(Mailer::default());

    let first = orchestrator.attach(&mailer).unwrap();
    let second = orchestrator.attach(&mailer).unwrap();
    orchestrator.detach(&first);

    assert_eq!(orchestrator.subscription_count(), 2);
    orchestrator.detach(&second);
    assert_eq!(orchestrator.subscription_count(), 0);
}

#[test]
fn test_method_listener_unsubscribes_by_descriptor() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let mailer = Arc::new(Mailer::default());
    orchestrator.attach(&mailer).unwrap();

    // A freshly built handle for the same method matches the registration.
    let handle = ListenerRef::method(&mailer, "on_signup", Mailer::on_signup);
    assert_eq!(orchestrator.is_subscribed("signup", &handle), Some(0));
    assert_eq!(orchestrator.unsubscribe("signup", &handle), 1);
    assert!(!orchestrator.has_subscribers("signup"));

    // Another owner's method does not match.
    let other = Arc::new(Mailer::default());
    let foreign = ListenerRef::method(&other, "on_any", Mailer::on_any);
    assert_eq!(orchestrator.unsubscribe("any", &foreign), 0);
}

#[test]
fn test_attach_replays_held_events() {
    let orchestrator = holding_orchestrator();
    orchestrator
        .publish(Event::named("signup").with("user", json!("lin")))
        .unwrap();

    let mailer = Arc::new(Mailer::default());
    let attached = orchestrator.attach(&mailer).unwrap();

    // Replayed by the first handler, so the later `any` handler never sees it.
    assert_eq!(attached.replayed().count(), 1);
    assert!(attached.replayed().all(Result::is_ok));
    assert_eq!(mailer.sent(), ["welcome \"lin\""]);
}

struct Broken;

impl Observer for Broken {
    fn handlers(self: &Arc<Self>) -> Vec<Handler> {
        vec![
            Handler::new("fine", ListenerRef::from_fn(|_| Ok(None))),
            Handler::new("*", ListenerRef::from_fn(|_| Ok(None))),
        ]
    }
}

#[test]
fn test_invalid_handler_table_registers_nothing() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    assert!(orchestrator.attach(&Arc::new(Broken)).is_err());
    assert_eq!(orchestrator.subscription_count(), 0);
}
