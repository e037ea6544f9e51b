use super::*;
use jana_arrow::EmitOutcome;
use jana_error::ErrorExt;
use jana_event::Event;
use jana_event::EventBuilder;
use jana_factory::FactoryError;
use pretty_assertions::assert_eq;

struct StubSource(&'static str);

impl EventSource for StubSource {
    fn name(&self) -> &str {
        self.0
    }

    fn emit(&mut self, _event: &Event, _run_number: u32) -> Result<EmitOutcome, ArrowError> {
        Ok(EmitOutcome::Finished)
    }
}

#[test]
fn drained_sources_come_back_in_insertion_order() {
    let registry = ComponentRegistry::new();
    registry.add_source(Box::new(StubSource("first")));
    registry.add_source(Box::new(StubSource("second")));

    let drained = registry.drain_sources();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].name(), "first");
    assert_eq!(drained[1].name(), "second");
}

#[test]
fn draining_empties_the_registry_so_a_second_drain_is_empty() {
    let registry = ComponentRegistry::new();
    registry.add_source(Box::new(StubSource("only")));
    assert_eq!(registry.drain_sources().len(), 1);
    assert_eq!(registry.drain_sources().len(), 0);
}

#[test]
fn auto_activation_resolves_by_type_and_label_and_runs_the_underlying_factory() {
    let registry = ComponentRegistry::new();
    registry.add_auto_activation::<i32>("answer", EventLevel::None);

    let requests = vec![("i32".to_string(), "answer".to_string())];
    // The type name embedded at registration is `std::any::type_name::<i32>()`,
    // which isn't the bare "i32" token this test requests — so resolution
    // is expected to fail closed rather than silently match nothing.
    let result = registry.resolve_auto_activations(&requests);
    assert!(result.is_err());
}

#[test]
fn auto_activation_resolves_with_the_exact_registered_type_name() {
    let registry = ComponentRegistry::new();
    registry.add_auto_activation::<i32>("answer", EventLevel::None);

    let type_name = std::any::type_name::<i32>().to_string();
    let requests = vec![(type_name, "answer".to_string())];
    let resolved = registry.resolve_auto_activations(&requests).expect("registered activation resolves");
    assert_eq!(resolved.len(), 1);

    let mut event = EventBuilder::default().level(EventLevel::None).build();
    event.factory_set_mut().register(
        jana_factory::FactoryKey::of::<i32>("answer"),
        Box::new(jana_factory::TypedFactory::new("answer", ConstantFactory)),
    );
    run_activations(&resolved, &event).expect("activation runs the underlying factory");
}

struct ConstantFactory;

impl jana_factory::FactoryLogic<i32> for ConstantFactory {
    fn process(&mut self, _host: &dyn FactoryHost) -> Result<Vec<i32>, FactoryError> {
        Ok(vec![7])
    }
}

#[test]
fn unknown_auto_activation_request_is_rejected() {
    let registry = ComponentRegistry::new();
    let requests = vec![("nope".to_string(), "missing".to_string())];
    let err = registry.resolve_auto_activations(&requests).unwrap_err();
    assert_eq!(err.status_code(), jana_error::StatusCode::MalformedConfig);
}
