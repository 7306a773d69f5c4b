mod common;

use common::clocked_orchestrator;
use herald::{Event, InvalidSubscription, SubscribeError, SubscribeOptions, Unsubscribe, testing::CountingListener};
use std::time::Duration;

#[test]
fn test_timer_fires_when_due() {
    let (orchestrator, clock) = clocked_orchestrator();
    let ticks = CountingListener::new();
    orchestrator
        .subscribe(
            "timer",
            ticks.to_ref(),
            SubscribeOptions::new().every(Duration::from_millis(100)),
        )
        .unwrap();

    orchestrator.publish(Event::timer()).unwrap();
    assert_eq!(ticks.count(), 0);

    clock.advance(Duration::from_millis(100));
    orchestrator.publish(Event::timer()).unwrap();
    assert_eq!(ticks.count(), 1);

    // Not due again until the next interval.
    orchestrator.publish(Event::timer()).unwrap();
    assert_eq!(ticks.count(), 1);
}

#[test]
fn test_timer_fires_at_most_once_per_publish() {
    let (orchestrator, clock) = clocked_orchestrator();
    let ticks = CountingListener::new();
    orchestrator
        .subscribe(
            "timer",
            ticks.to_ref(),
            SubscribeOptions::new().every(Duration::from_millis(100)),
        )
        .unwrap();

    clock.advance(Duration::from_millis(550));
    orchestrator.publish(Event::timer()).unwrap();
    assert_eq!(ticks.count(), 1);

    // One interval per publish until the schedule reaches the clock.
    for _ in 0..10 {
        orchestrator.publish(Event::timer()).unwrap();
    }
    assert_eq!(ticks.count(), 5);
}

#[test]
fn test_ordinary_listeners_on_timer_identity_always_fire() {
    let (orchestrator, _clock) = clocked_orchestrator();
    let every_tick = CountingListener::new();
    orchestrator
        .subscribe("timer", every_tick.to_ref(), SubscribeOptions::new())
        .unwrap();

    orchestrator.publish(Event::timer()).unwrap();
    orchestrator.publish(Event::timer()).unwrap();
    assert_eq!(every_tick.count(), 2);
}

#[test]
fn test_zero_interval_rejected() {
    let (orchestrator, _clock) = clocked_orchestrator();
    let err = orchestrator
        .subscribe(
            "timer",
            CountingListener::new().to_ref(),
            SubscribeOptions::new().every(Duration::ZERO),
        )
        .unwrap_err();

    assert_eq!(
        err,
        SubscribeError::InvalidSubscription(InvalidSubscription::ZeroInterval)
    );
    assert!(!orchestrator.has_subscribers("timer"));
}

#[test]
fn test_unsubscribe_timer_by_interval() {
    let (orchestrator, _clock) = clocked_orchestrator();
    let ticks = CountingListener::new();
    let handle = ticks.to_ref();
    orchestrator
        .subscribe("timer", handle.clone(), SubscribeOptions::new().every(Duration::from_secs(1)))
        .unwrap();
    orchestrator
        .subscribe("timer", handle.clone(), SubscribeOptions::new().every(Duration::from_secs(5)))
        .unwrap();

    assert_eq!(
        orchestrator.unsubscribe("timer", Unsubscribe::Timer(handle.clone(), Duration::from_secs(5))),
        1
    );
    assert_eq!(orchestrator.subscription_count(), 1);
    assert_eq!(
        orchestrator.unsubscribe("timer", Unsubscribe::Timer(handle, Duration::from_secs(5))),
        0
    );
}
