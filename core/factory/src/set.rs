//! [`FactorySet`]: a per-event map of `(type_id, label) -> Factory`, with
//! at-most-once `Process` semantics and cycle detection (§3 FactorySet,
//! §4.3).

use crate::error::CycleDetectedSnafu;
use crate::error::FactoryError;
use crate::error::NotRegisteredSnafu;
use crate::error::UnresolvedInputLevelSnafu;
use crate::host::FactoryHost;
use crate::key::FactoryKey;
use crate::typed::AnyFactory;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::thread::ThreadId;

enum Slot {
    /// Registered, not currently being computed, no cached output.
    Idle(Box<dyn AnyFactory>),
    /// A thread is inside `process_erased` for this key.
    Computing { owner: ThreadId },
    /// Cached output available; `factory` is kept around for `reset`,
    /// introspection, and `ChangeRun` bookkeeping.
    Ready {
        factory: Box<dyn AnyFactory>,
        output: Arc<dyn Any + Send + Sync>,
    },
}

struct Inner {
    slots: HashMap<FactoryKey, Slot>,
    /// `(key, type name, owning thread)` entries for every in-progress
    /// computation on this `FactorySet`, used to render a human-readable
    /// cycle chain.
    call_stack: Vec<(FactoryKey, &'static str, ThreadId)>,
}

/// Per-event map of `(type_id, label) -> Factory`. Insertion is allowed
/// only during event setup (§3 invariant); after that, callers only ever
/// `get`/`insert` the values of keys already present.
pub struct FactorySet {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl Default for FactorySet {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorySet {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                call_stack: Vec::new(),
            }),
            condvar: Condvar::new(),
        }
    }

    /// Registers a factory under `key`. Only valid during event setup —
    /// callers (the event pool) must not call this once the event has
    /// entered the topology.
    pub fn register(&mut self, key: FactoryKey, factory: Box<dyn AnyFactory>) {
        self.inner
            .get_mut()
            .expect("FactorySet mutex poisoned")
            .slots
            .insert(key, Slot::Idle(factory));
    }

    pub fn is_registered(&self, key: FactoryKey) -> bool {
        self.inner
            .lock()
            .expect("FactorySet mutex poisoned")
            .slots
            .contains_key(&key)
    }

    /// Resolves an input declared at `level`, walking the ancestor chain
    /// via `host` when `level` differs from the host's own level, then
    /// running (or returning the cached result of) the matching factory on
    /// that event's `FactorySet`.
    pub fn get<T: 'static + Send + Sync>(
        label: &'static str,
        level: crate::level::EventLevel,
        host: &dyn FactoryHost,
    ) -> Result<Arc<Vec<T>>, FactoryError> {
        let target_host: &dyn FactoryHost = if level == host.level() {
            host
        } else {
            host.ancestor(level)
                .ok_or_else(|| {
                    UnresolvedInputLevelSnafu {
                        type_name: std::any::type_name::<T>(),
                        label: label.to_string(),
                        level,
                    }
                    .build()
                })?
        };
        target_host.factory_set().get_local::<T>(label, target_host)
    }

    /// Same as [`FactorySet::get`] but resolves against `host`'s own level
    /// without any ancestor walk; used for same-level input access.
    pub fn get_local<T: 'static + Send + Sync>(
        &self,
        label: &'static str,
        host: &dyn FactoryHost,
    ) -> Result<Arc<Vec<T>>, FactoryError> {
        let key = FactoryKey::of::<T>(label);
        let current_thread = std::thread::current().id();

        loop {
            let mut inner = self.inner.lock().expect("FactorySet mutex poisoned");
            match inner.slots.remove(&key) {
                None => {
                    return NotRegisteredSnafu {
                        type_name: std::any::type_name::<T>(),
                        label: label.to_string(),
                    }
                    .fail();
                }
                Some(Slot::Ready { factory, output }) => {
                    inner.slots.insert(key, Slot::Ready { factory, output: output.clone() });
                    return Ok(downcast(output));
                }
                Some(Slot::Computing { owner }) if owner == current_thread => {
                    let chain = render_chain(&inner.call_stack, key);
                    inner.slots.insert(key, Slot::Computing { owner });
                    return CycleDetectedSnafu { chain }.fail();
                }
                Some(slot @ Slot::Computing { .. }) => {
                    inner.slots.insert(key, slot);
                    let _unused = self
                        .condvar
                        .wait(inner)
                        .expect("FactorySet condvar poisoned");
                    continue;
                }
                Some(Slot::Idle(factory)) => {
                    let type_name = factory.type_name();
                    inner.call_stack.push((key, type_name, current_thread));
                    inner
                        .slots
                        .insert(key, Slot::Computing { owner: current_thread });
                    drop(inner);

                    let result = run_one(factory, host);

                    let mut inner = self.inner.lock().expect("FactorySet mutex poisoned");
                    inner
                        .call_stack
                        .retain(|(k, _, t)| !(*k == key && *t == current_thread));
                    match result {
                        Ok(mut factory) => {
                            let output = factory.output_any();
                            inner.slots.insert(
                                key,
                                Slot::Ready {
                                    factory: {
                                        let _ = &mut factory;
                                        factory
                                    },
                                    output: output.clone(),
                                },
                            );
                            self.condvar.notify_all();
                            return Ok(downcast(output));
                        }
                        Err((factory, err)) => {
                            inner.slots.insert(key, Slot::Idle(factory));
                            self.condvar.notify_all();
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Bypasses `Process`: marks the factory `Inserted` and caches
    /// `objects` directly (§4.3 `Insert`).
    pub fn insert<T: 'static + Send + Sync>(
        &self,
        label: &'static str,
        objects: Vec<T>,
    ) -> Result<(), FactoryError> {
        let key = FactoryKey::of::<T>(label);
        let mut inner = self.inner.lock().expect("FactorySet mutex poisoned");
        let slot = inner.slots.remove(&key).ok_or_else(|| {
            NotRegisteredSnafu {
                type_name: std::any::type_name::<T>(),
                label: label.to_string(),
            }
            .build()
        })?;
        let mut factory = match slot {
            Slot::Idle(f) => f,
            Slot::Ready { factory, .. } => factory,
            Slot::Computing { owner } => {
                inner.slots.insert(key, Slot::Computing { owner });
                return NotRegisteredSnafu {
                    type_name: std::any::type_name::<T>(),
                    label: label.to_string(),
                }
                .fail();
            }
        };
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(objects);
        factory.insert_erased(erased.clone())?;
        inner.slots.insert(
            key,
            Slot::Ready {
                factory,
                output: erased,
            },
        );
        Ok(())
    }

    /// Resets every registered factory for recycling: non-persistent
    /// factories drop their cached output and return to `Idle`/
    /// `Unprocessed`; persistent factories (§3 `PERSISTENT` flag) are left
    /// untouched (§4.2).
    pub fn reset_for_recycle(&mut self) {
        let inner = self.inner.get_mut().expect("FactorySet mutex poisoned");
        inner.call_stack.clear();
        let keys: Vec<FactoryKey> = inner.slots.keys().copied().collect();
        for key in keys {
            if let Some(Slot::Ready { mut factory, .. }) = inner.slots.remove(&key) {
                if factory.flags().persistent {
                    inner.slots.insert(
                        key,
                        Slot::Ready {
                            output: factory.output_any(),
                            factory,
                        },
                    );
                } else {
                    factory.reset();
                    inner.slots.insert(key, Slot::Idle(factory));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("FactorySet mutex poisoned").slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn downcast<T: 'static + Send + Sync>(output: Arc<dyn Any + Send + Sync>) -> Arc<Vec<T>> {
    output
        .downcast::<Vec<T>>()
        .unwrap_or_else(|_| panic!("factory output type mismatch for {}", std::any::type_name::<T>()))
}

fn render_chain(call_stack: &[(FactoryKey, &'static str, ThreadId)], cycle_key: FactoryKey) -> String {
    let start = call_stack
        .iter()
        .position(|(k, _, _)| *k == cycle_key)
        .unwrap_or(0);
    let mut chain: Vec<String> = call_stack[start..]
        .iter()
        .map(|(k, type_name, _)| format!("{type_name}:{}", k.label))
        .collect();
    if let Some(repeat) = chain.first().cloned() {
        chain.push(repeat);
    }
    chain.join(" -> ")
}

fn run_one(
    mut factory: Box<dyn AnyFactory>,
    host: &dyn FactoryHost,
) -> Result<Box<dyn AnyFactory>, (Box<dyn AnyFactory>, FactoryError)> {
    match factory.run_process(host) {
        Ok(()) => Ok(factory),
        Err(err) => Err((factory, err)),
    }
}

#[cfg(test)]
#[path = "set.test.rs"]
mod tests;
