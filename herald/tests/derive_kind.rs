#![cfg(feature = "macros")]

mod common;

use common::init_tracing;
use herald::{
    Event, EventFactory, Kind, KindFactory, Orchestrator, SubscribeOptions,
    prelude::EventKind, testing::CallLog,
};

#[derive(EventKind)]
struct Ping;

#[derive(EventKind)]
#[event(type_name = "user.created", extends("user.changed", "user"), implements("auditable"))]
struct UserCreated {
    #[allow(dead_code)]
    id: u64,
}

#[derive(EventKind)]
#[event(type_name = "user.deleted", extends("user.changed"))]
#[event(implements("auditable", "destructive"))]
struct UserDeleted;

#[test]
fn test_default_type_name_is_struct_name() {
    assert_eq!(Ping::kind().type_name(), "Ping");
    assert_eq!(Ping::kind().ancestors().count(), 0);
}

#[test]
fn test_declared_identities() {
    let ids: Vec<String> = UserCreated::kind().identities().map(str::to_owned).collect();
    assert_eq!(ids, ["user.created", "user.changed", "user", "auditable"]);

    let ids: Vec<String> = UserDeleted::kind().identities().map(str::to_owned).collect();
    assert_eq!(ids, ["user.deleted", "user.changed", "auditable", "destructive"]);
}

#[test]
fn test_subscribe_kind_and_publish_typed_events() {
    init_tracing();
    let orchestrator = Orchestrator::new();
    let log = CallLog::new();

    orchestrator
        .subscribe_kind::<UserCreated>(log.listener("created"), SubscribeOptions::new())
        .unwrap();
    orchestrator
        .subscribe("user.changed", log.listener("changed"), SubscribeOptions::new())
        .unwrap();
    orchestrator
        .subscribe("destructive", log.listener("destructive"), SubscribeOptions::new())
        .unwrap();

    orchestrator.publish(Event::of::<UserCreated>()).unwrap();
    orchestrator.publish(Event::of::<UserDeleted>()).unwrap();

    assert_eq!(log.entries(), ["created", "changed", "changed", "destructive"]);
}

#[test]
fn test_factory_builds_derived_kinds() {
    let factory = KindFactory::new().with_kind::<UserDeleted>().with_kind::<Ping>();

    let event = factory.create("user.deleted").unwrap();
    assert!(event.is_a("destructive"));
    assert_eq!(factory.create("Ping").unwrap().identity(), "Ping");
    assert!(factory.create("user.created").is_err());
}
