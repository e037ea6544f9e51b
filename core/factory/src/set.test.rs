use super::*;
use crate::error::FactoryError;
use crate::host::FactoryHost;
use crate::level::EventLevel;

struct Host<'a> {
    level: EventLevel,
    set: &'a FactorySet,
}

impl<'a> FactoryHost for Host<'a> {
    fn run_number(&self) -> u32 {
        1
    }

    fn event_number(&self) -> u64 {
        0
    }

    fn level(&self) -> EventLevel {
        self.level
    }

    fn factory_set(&self) -> &FactorySet {
        self.set
    }

    fn ancestor(&self, _level: EventLevel) -> Option<&dyn FactoryHost> {
        None
    }
}

struct ConstLogic(i32);

impl crate::typed::FactoryLogic<i32> for ConstLogic {
    fn process(&mut self, _host: &dyn FactoryHost) -> Result<Vec<i32>, FactoryError> {
        Ok(vec![self.0])
    }
}

/// Factory A whose `process` calls `get::<B>`, and vice versa — used to
/// exercise cycle detection below.
struct CyclicA;
struct CyclicB;

impl crate::typed::FactoryLogic<&'static str> for CyclicA {
    fn process(&mut self, host: &dyn FactoryHost) -> Result<Vec<&'static str>, FactoryError> {
        FactorySet::get::<i32>("b", host.level(), host)?;
        Ok(vec!["a"])
    }
}

impl crate::typed::FactoryLogic<i32> for CyclicB {
    fn process(&mut self, host: &dyn FactoryHost) -> Result<Vec<i32>, FactoryError> {
        FactorySet::get::<&'static str>("a", host.level(), host)?;
        Ok(vec![0])
    }
}

fn registered_set() -> FactorySet {
    let mut set = FactorySet::new();
    set.register(
        FactoryKey::of::<i32>("answer"),
        Box::new(crate::typed::TypedFactory::new("answer", ConstLogic(42))),
    );
    set
}

#[test]
fn get_twice_returns_pointer_equal_output_and_runs_process_once() {
    let set = registered_set();
    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    let first = set.get_local::<i32>("answer", &host).expect("first get");
    let second = set.get_local::<i32>("answer", &host).expect("second get");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(*first, vec![42]);
}

#[test]
fn insert_bypasses_process_and_subsequent_get_returns_inserted_value() {
    let mut set = FactorySet::new();
    set.register(
        FactoryKey::of::<i32>("answer"),
        Box::new(crate::typed::TypedFactory::new("answer", ConstLogic(0))),
    );
    set.insert::<i32>("answer", vec![7]).expect("insert");

    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    let got = set.get_local::<i32>("answer", &host).expect("get after insert");
    assert_eq!(*got, vec![7]);
}

#[test]
fn get_unregistered_key_fails() {
    let set = FactorySet::new();
    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    let err = set.get_local::<i32>("missing", &host).unwrap_err();
    assert!(matches!(err, FactoryError::NotRegistered { .. }));
}

#[test]
fn self_reentrant_get_is_reported_as_a_cycle() {
    let mut set = FactorySet::new();
    set.register(
        FactoryKey::of::<&'static str>("a"),
        Box::new(crate::typed::TypedFactory::new("a", CyclicA)),
    );
    set.register(
        FactoryKey::of::<i32>("b"),
        Box::new(crate::typed::TypedFactory::new("b", CyclicB)),
    );
    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    let err = FactorySet::get::<&'static str>("a", EventLevel::PhysicsEvent, &host).unwrap_err();
    match err {
        FactoryError::CycleDetected { chain } => {
            assert!(chain.contains("a"));
            assert!(chain.contains("b"));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn reset_for_recycle_clears_non_persistent_factories() {
    let mut set = registered_set();
    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    set.get_local::<i32>("answer", &host).expect("get");
    set.reset_for_recycle();
    assert!(set.is_registered(FactoryKey::of::<i32>("answer")));
    let host = Host {
        level: EventLevel::PhysicsEvent,
        set: &set,
    };
    // After reset, Process runs again (status was Unprocessed, not Processed).
    let got = set.get_local::<i32>("answer", &host).expect("get after reset");
    assert_eq!(*got, vec![42]);
}
