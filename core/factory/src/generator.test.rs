use super::*;
use crate::error::FactoryError;
use crate::host::FactoryHost;
use crate::set::FactorySet;

struct Doubler {
    input: i32,
}

impl FactoryLogic<i32> for Doubler {
    fn process(&mut self, _host: &dyn FactoryHost) -> Result<Vec<i32>, FactoryError> {
        Ok(vec![self.input * 2])
    }
}

#[test]
fn generator_produces_uninit_factory_under_its_key() {
    let gen = generator_for::<i32, _>("doubled", EventLevel::PhysicsEvent, || Doubler { input: 21 });
    assert_eq!(gen.level(), EventLevel::PhysicsEvent);
    assert_eq!(gen.key(), FactoryKey::of::<i32>("doubled"));

    let factory = gen.instantiate();
    assert_eq!(factory.status(), crate::status::FactoryStatus::Uninit);
}

#[test]
fn generator_can_populate_a_factory_set() {
    let gen = generator_for::<i32, _>("doubled", EventLevel::PhysicsEvent, || Doubler { input: 5 });
    let mut set = FactorySet::new();
    set.register(gen.key(), gen.instantiate());
    assert!(set.is_registered(FactoryKey::of::<i32>("doubled")));
}
