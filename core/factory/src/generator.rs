//! Factory construction at event-creation time.
//!
//! Each event level is configured with a set of generators; when the pool
//! builds a fresh `FactorySet` for a newly-allocated event (or a recycled
//! one that doesn't carry a persistent factory across cycles), it asks
//! every generator declared for that level to produce a fresh, `Uninit`
//! factory and registers it under the generator's key.

use crate::key::FactoryKey;
use crate::level::EventLevel;
use crate::typed::AnyFactory;
use crate::typed::FactoryLogic;
use crate::typed::TypedFactory;
use std::marker::PhantomData;

/// Object-safe factory constructor, one per declared `(type, label)` at a
/// given level. Implementations are produced by [`generator_for`]; callers
/// never need to implement this trait by hand.
pub trait FactoryGenerator: Send + Sync {
    fn key(&self) -> FactoryKey;
    fn type_name(&self) -> &'static str;
    fn level(&self) -> EventLevel;
    fn instantiate(&self) -> Box<dyn AnyFactory>;
}

struct TypedGenerator<T, F> {
    label: &'static str,
    level: EventLevel,
    make: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F, L> FactoryGenerator for TypedGenerator<T, F>
where
    T: 'static + Send + Sync,
    L: FactoryLogic<T> + 'static,
    F: Fn() -> L + Send + Sync,
{
    fn key(&self) -> FactoryKey {
        FactoryKey::of::<T>(self.label)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn level(&self) -> EventLevel {
        self.level
    }

    fn instantiate(&self) -> Box<dyn AnyFactory> {
        Box::new(TypedFactory::new(self.label, (self.make)()))
    }
}

/// Builds a [`FactoryGenerator`] for output type `T`, declared at `level`,
/// under disambiguator `label`, constructing a fresh `L: FactoryLogic<T>`
/// via `make` each time a new factory instance is needed.
pub fn generator_for<T, L>(
    label: &'static str,
    level: EventLevel,
    make: impl Fn() -> L + Send + Sync + 'static,
) -> Box<dyn FactoryGenerator>
where
    T: 'static + Send + Sync,
    L: FactoryLogic<T> + 'static,
{
    Box::new(TypedGenerator::<T, _> {
        label,
        level,
        make,
        _marker: PhantomData,
    })
}

#[cfg(test)]
#[path = "generator.test.rs"]
mod tests;
