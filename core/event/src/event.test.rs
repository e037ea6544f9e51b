use super::*;
use jana_factory::FactoryHost;
use std::sync::Arc;

#[test]
fn builder_stamps_all_fields() {
    let event = Event::builder()
        .run_number(3)
        .event_number(42)
        .event_index(7)
        .level(EventLevel::PhysicsEvent)
        .barrier(true)
        .source_id(1)
        .build();

    assert_eq!(event.run_number(), 3);
    assert_eq!(event.event_number(), 42);
    assert_eq!(event.event_index(), 7);
    assert_eq!(event.level(), EventLevel::PhysicsEvent);
    assert!(event.is_barrier());
    assert_eq!(event.source_id(), 1);
}

#[test]
fn ancestor_walk_finds_coarser_level_through_the_chain() {
    let run = Arc::new(
        Event::builder()
            .level(EventLevel::Run)
            .event_index(0)
            .build(),
    );
    let timeslice = Arc::new(
        Event::builder()
            .level(EventLevel::Timeslice)
            .event_index(1)
            .parent(Some(run.clone()))
            .build(),
    );
    let physics_event = Event::builder()
        .level(EventLevel::PhysicsEvent)
        .event_index(2)
        .parent(Some(timeslice.clone()))
        .build();

    assert!(std::ptr::eq(
        physics_event.parent_at(EventLevel::Timeslice).unwrap(),
        timeslice.as_ref(),
    ));
    assert!(std::ptr::eq(
        physics_event.parent_at(EventLevel::Run).unwrap(),
        run.as_ref(),
    ));
    assert!(physics_event.parent_at(EventLevel::Subrun).is_none());
}

#[test]
fn ancestor_via_factory_host_trait_matches_parent_at() {
    let run = Arc::new(Event::builder().level(EventLevel::Run).build());
    let physics_event = Event::builder()
        .level(EventLevel::PhysicsEvent)
        .parent(Some(run.clone()))
        .build();

    let host: &dyn FactoryHost = &physics_event;
    let ancestor = host.ancestor(EventLevel::Run).expect("run ancestor");
    assert_eq!(ancestor.level(), EventLevel::Run);
}

#[test]
fn mark_failed_is_visible_and_cleared_by_restamp() {
    let mut event = Event::new_empty(EventLevel::None);
    assert!(!event.is_failed());
    event.mark_failed(crate::EventFailure::new("DemoFactory", "boom").with_plugin("demo_plugin"));
    assert!(event.is_failed());
    let failure = event.failure().expect("failure recorded");
    assert_eq!(failure.component, "DemoFactory");
    assert_eq!(failure.plugin.as_deref(), Some("demo_plugin"));

    event.restamp(1, 0, 0, false, 0, None);
    assert!(!event.is_failed(), "recycle clears the prior failure");
}

#[test]
fn restamp_overwrites_identity_for_reuse() {
    let mut event = Event::new_empty(EventLevel::PhysicsEvent);
    event.restamp(1, 10, 100, false, 0, None);
    assert_eq!(event.run_number(), 1);
    event.restamp(2, 20, 200, true, 5, None);
    assert_eq!(event.run_number(), 2);
    assert_eq!(event.event_number(), 20);
    assert_eq!(event.event_index(), 200);
    assert!(event.is_barrier());
    assert_eq!(event.source_id(), 5);
}
