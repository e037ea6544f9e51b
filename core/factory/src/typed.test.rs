use super::*;
use crate::host::FactoryHost;
use crate::level::EventLevel;
use crate::set::FactorySet;

struct StubHost {
    run_number: u32,
    set: FactorySet,
}

impl FactoryHost for StubHost {
    fn run_number(&self) -> u32 {
        self.run_number
    }

    fn event_number(&self) -> u64 {
        0
    }

    fn level(&self) -> EventLevel {
        EventLevel::PhysicsEvent
    }

    fn factory_set(&self) -> &FactorySet {
        &self.set
    }

    fn ancestor(&self, _level: EventLevel) -> Option<&dyn FactoryHost> {
        None
    }
}

struct CountingLogic {
    calls: std::cell::Cell<u32>,
    last_run_seen: std::cell::Cell<Option<u32>>,
}

impl FactoryLogic<i32> for CountingLogic {
    fn process(&mut self, host: &dyn FactoryHost) -> Result<Vec<i32>, FactoryError> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![host.run_number() as i32])
    }

    fn change_run(&mut self, run_number: u32) -> Result<(), FactoryError> {
        self.last_run_seen.set(Some(run_number));
        Ok(())
    }
}

fn host(run_number: u32) -> StubHost {
    StubHost {
        run_number,
        set: FactorySet::new(),
    }
}

#[test]
fn run_process_transitions_uninit_to_processed() {
    let mut factory = TypedFactory::new(
        "",
        CountingLogic {
            calls: std::cell::Cell::new(0),
            last_run_seen: std::cell::Cell::new(None),
        },
    );
    assert_eq!(factory.status(), FactoryStatus::Uninit);
    factory.run_process(&host(7)).expect("process succeeds");
    assert_eq!(factory.status(), FactoryStatus::Processed);
    assert!(!factory.created_this_run());
}

#[test]
fn change_run_fires_only_when_run_number_differs() {
    let mut factory = TypedFactory::new(
        "",
        CountingLogic {
            calls: std::cell::Cell::new(0),
            last_run_seen: std::cell::Cell::new(None),
        },
    );
    factory.run_process(&host(1)).unwrap();
    factory.run_process(&host(1)).unwrap();
    assert_eq!(factory.last_run(), Some(1));

    factory.run_process(&host(2)).unwrap();
    assert_eq!(factory.last_run(), Some(2));
}

#[test]
fn insert_bypasses_process_and_marks_inserted() {
    let mut factory = TypedFactory::new(
        "",
        CountingLogic {
            calls: std::cell::Cell::new(0),
            last_run_seen: std::cell::Cell::new(None),
        },
    );
    factory
        .insert_erased(std::sync::Arc::new(vec![99i32]))
        .expect("insert succeeds");
    assert_eq!(factory.status(), FactoryStatus::Inserted);
    let output = factory.output_any().downcast::<Vec<i32>>().unwrap();
    assert_eq!(*output, vec![99]);
}

#[test]
fn reset_clears_non_persistent_output() {
    let mut factory = TypedFactory::new(
        "",
        CountingLogic {
            calls: std::cell::Cell::new(0),
            last_run_seen: std::cell::Cell::new(None),
        },
    );
    factory.run_process(&host(1)).unwrap();
    factory.reset();
    assert_eq!(factory.status(), FactoryStatus::Unprocessed);
}
