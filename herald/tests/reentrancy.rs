mod common;

use common::init_tracing;
use herald::{Event, Orchestrator, SubscribeOptions, testing::CallLog};
use serde_json::json;

#[test]
fn test_subscribe_during_dispatch_affects_next_pass_only() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let log = CallLog::new();
    let weak = orchestrator.downgrade();
    let late = log.listener("late");

    let outer_log = log.clone();
    orchestrator
        .on("e", move |_| {
            outer_log.push("registrar");
            if let Some(orchestrator) = weak.upgrade() {
                if orchestrator.is_subscribed("e", &late).is_none() {
                    orchestrator.subscribe("e", late.clone(), SubscribeOptions::new())?;
                }
            }
            Ok(None)
        })
        .unwrap();

    orchestrator.publish(Event::named("e")).unwrap();
    assert_eq!(log.entries(), ["registrar"]);

    log.clear();
    orchestrator.publish(Event::named("e")).unwrap();
    assert_eq!(log.entries(), ["registrar", "late"]);
}

#[test]
fn test_unsubscribe_during_dispatch_keeps_current_snapshot() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let log = CallLog::new();
    let weak = orchestrator.downgrade();
    let victim = log.listener("victim");

    let remover = victim.clone();
    orchestrator
        .on("e", move |_| {
            if let Some(orchestrator) = weak.upgrade() {
                orchestrator.unsubscribe("e", &remover);
            }
            Ok(None)
        })
        .unwrap();
    orchestrator.subscribe("e", victim, SubscribeOptions::new()).unwrap();

    orchestrator.publish(Event::named("e")).unwrap();
    assert_eq!(log.entries(), ["victim"]);

    orchestrator.publish(Event::named("e")).unwrap();
    assert_eq!(log.entries(), ["victim"]);
}

#[test]
fn test_listener_publishes_follow_up_through_bound_dispatcher() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let log = CallLog::new();

    orchestrator
        .on("order.placed", |event: &mut Event| {
            let id = event.get("id").cloned().unwrap_or(json!(null));
            if let Some(dispatcher) = event.dispatcher() {
                dispatcher.publish(Event::named("invoice.requested").with("order", id))?;
            }
            Ok(None)
        })
        .unwrap();
    orchestrator
        .subscribe("invoice.requested", log.listener("invoice"), SubscribeOptions::new())
        .unwrap();

    orchestrator
        .publish(Event::named("order.placed").with("id", json!(42)))
        .unwrap();
    assert_eq!(log.entries(), ["invoice"]);
}

#[test]
fn test_nested_failure_propagates_to_outer_publisher() {
    init_tracing();
    let orchestrator = Orchestrator::new();

    orchestrator
        .on("outer", |event: &mut Event| {
            if let Some(dispatcher) = event.dispatcher() {
                dispatcher.publish(Event::named("inner"))?;
            }
            Ok(None)
        })
        .unwrap();
    orchestrator.on("inner", |_| Err("inner broke".into())).unwrap();

    let err = orchestrator.publish(Event::named("outer")).unwrap_err();
    assert!(err.to_string().contains("inner broke"));
}
