//! [`ComponentRegistry`]: the explicit typed registration API that stands
//! in for `dlopen` + `dynamic_cast` (§9 design note, §4 supplemented
//! feature).
//!
//! A CLI or embedding application registers its sources, processors, and
//! factory generators here, in whatever order its own `main` calls them;
//! `Initialize` later drains each list, in that same insertion order, to
//! assemble the concrete `jana_arrow` topology. Registration itself is
//! rare and never contended against the hot path, so a plain `Mutex`
//! around each `Vec` is enough.

use crate::error::EngineError;
use crate::error::UnknownAutoActivationSnafu;
use jana_arrow::ArrowError;
use jana_arrow::EventSource;
use jana_arrow::MultilevelSource;
use jana_arrow::Processor;
use jana_factory::EventLevel;
use jana_factory::FactoryGenerator;
use jana_factory::FactoryHost;
use jana_factory::FactorySet;
use std::sync::Arc;
use std::sync::Mutex;

/// One entry of the auto-activation catalog: a factory the embedding
/// application registered as eligible for forced activation, named by its
/// output type and label so `--auto_activate=type[:label]` can find it by
/// string match at `Initialize` time without this crate needing to name
/// the concrete output type anywhere else.
struct AutoActivationEntry {
    type_name: &'static str,
    label: &'static str,
    thunk: Arc<dyn Fn(&dyn FactoryHost) -> Result<(), jana_factory::FactoryError> + Send + Sync>,
}

/// Insertion-order registration surface for the components a topology is
/// built from. Holds no arrows, queues, or pools itself — those are
/// assembled from what's registered here once, at `Initialize`.
#[derive(Default)]
pub struct ComponentRegistry {
    sources: Mutex<Vec<Box<dyn EventSource>>>,
    multilevel_sources: Mutex<Vec<Box<dyn MultilevelSource>>>,
    processors: Mutex<Vec<Box<dyn Processor>>>,
    factory_generators: Mutex<Vec<Box<dyn FactoryGenerator>>>,
    auto_activations: Mutex<Vec<AutoActivationEntry>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&self, source: Box<dyn EventSource>) {
        self.sources.lock().expect("registry mutex poisoned").push(source);
    }

    pub fn add_multilevel_source(&self, source: Box<dyn MultilevelSource>) {
        self.multilevel_sources.lock().expect("registry mutex poisoned").push(source);
    }

    pub fn add_processor(&self, processor: Box<dyn Processor>) {
        self.processors.lock().expect("registry mutex poisoned").push(processor);
    }

    pub fn add_factory_generator(&self, generator: Box<dyn FactoryGenerator>) {
        self.factory_generators.lock().expect("registry mutex poisoned").push(generator);
    }

    /// Declares output type `T` under `label` (at `level`) eligible for
    /// forced activation via `--auto_activate`. Usually called alongside
    /// [`ComponentRegistry::add_factory_generator`] for the same `(T,
    /// label)`, from code that already names `T` concretely.
    pub fn add_auto_activation<T>(&self, label: &'static str, level: EventLevel)
    where
        T: 'static + Send + Sync,
    {
        let thunk = Arc::new(move |host: &dyn FactoryHost| -> Result<(), jana_factory::FactoryError> {
            FactorySet::get::<T>(label, level, host).map(|_| ())
        });
        self.auto_activations.lock().expect("registry mutex poisoned").push(AutoActivationEntry {
            type_name: std::any::type_name::<T>(),
            label,
            thunk,
        });
    }

    pub fn drain_sources(&self) -> Vec<Box<dyn EventSource>> {
        std::mem::take(&mut self.sources.lock().expect("registry mutex poisoned"))
    }

    pub fn drain_multilevel_sources(&self) -> Vec<Box<dyn MultilevelSource>> {
        std::mem::take(&mut self.multilevel_sources.lock().expect("registry mutex poisoned"))
    }

    pub fn drain_processors(&self) -> Vec<Box<dyn Processor>> {
        std::mem::take(&mut self.processors.lock().expect("registry mutex poisoned"))
    }

    pub fn drain_factory_generators(&self) -> Vec<Box<dyn FactoryGenerator>> {
        std::mem::take(&mut self.factory_generators.lock().expect("registry mutex poisoned"))
    }

    /// Resolves `--auto_activate` requests (`(type_name, label)` pairs,
    /// already split by `jana_config::CliArgs::parse_auto_activate`)
    /// against the catalog, failing closed on the first name that matches
    /// nothing rather than silently ignoring a typo.
    pub fn resolve_auto_activations(
        &self,
        requests: &[(String, String)],
    ) -> Result<Vec<Arc<dyn Fn(&dyn FactoryHost) -> Result<(), jana_factory::FactoryError> + Send + Sync>>, EngineError>
    {
        let catalog = self.auto_activations.lock().expect("registry mutex poisoned");
        let mut resolved = Vec::with_capacity(requests.len());
        for (type_name, label) in requests {
            let entry = catalog
                .iter()
                .find(|entry| entry.type_name == type_name && entry.label == label)
                .ok_or_else(|| {
                    UnknownAutoActivationSnafu { type_name: type_name.clone(), label: label.clone() }.build()
                })?;
            resolved.push(entry.thunk.clone());
        }
        Ok(resolved)
    }
}

/// Converts a resolved activation list into a single closure an
/// `AutoActivateStage` can run per event, collapsing any factory error
/// into the `ArrowError` a `MapStage` is expected to return.
pub fn run_activations(
    activations: &[Arc<dyn Fn(&dyn FactoryHost) -> Result<(), jana_factory::FactoryError> + Send + Sync>],
    host: &dyn FactoryHost,
) -> Result<(), ArrowError> {
    for activation in activations {
        activation(host)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
