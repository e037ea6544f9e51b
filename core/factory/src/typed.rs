//! User-facing [`FactoryLogic`] trait plus the type-erased [`AnyFactory`]
//! wrapper a [`crate::FactorySet`] actually stores.
//!
//! Per the design note on "dynamic polymorphism without a base-class
//! registry" (§9), factories are not looked up via `dynamic_cast` across a
//! shared-object boundary: `FactorySet` stores `Box<dyn AnyFactory>` keyed
//! by `(TypeId, label)`, and the single `downcast` needed to hand a typed
//! `Arc<Vec<T>>` back to a caller is justified purely by that type-id
//! equality, exactly as §9 recommends.

use crate::error::FactoryError;
use crate::flags::FactoryFlags;
use crate::host::FactoryHost;
use crate::key::InputDecl;
use crate::status::FactoryStatus;
use std::any::Any;
use std::sync::Arc;

/// User-supplied factory behavior. A factory author implements this for
/// their output type `T`; the framework wraps it in a [`TypedFactory`] that
/// provides caching, status tracking, and run-change bookkeeping.
pub trait FactoryLogic<T: 'static + Send + Sync>: Send {
    /// Declared inputs this factory reads via [`FactoryHost`] /
    /// [`crate::FactorySet::get`] during `process`. Used for introspection
    /// and for wiring-driven auto-activation; not enforced at call time.
    fn inputs(&self) -> Vec<InputDecl> {
        Vec::new()
    }

    fn flags(&self) -> FactoryFlags {
        FactoryFlags::new()
    }

    /// Computes this factory's output for the event `host` is attached to.
    /// Invoked at most once per (event, factory) pair (§3 invariant).
    fn process(&mut self, host: &dyn FactoryHost) -> Result<Vec<T>, FactoryError>;

    /// Invoked once before `process` whenever the run number differs from
    /// the last run this factory instance observed (§4.3 "Run changes").
    fn change_run(&mut self, _run_number: u32) -> Result<(), FactoryError> {
        Ok(())
    }
}

/// The object-safe interface [`crate::FactorySet`] stores trait objects of.
/// Every [`TypedFactory<T, L>`] implements this; callers never interact
/// with it directly — they go through [`crate::FactorySet::get`] or
/// [`crate::FactorySet::insert`].
pub trait AnyFactory: Send {
    fn type_name(&self) -> &'static str;
    fn label(&self) -> &str;
    fn status(&self) -> FactoryStatus;
    fn flags(&self) -> FactoryFlags;
    fn inputs(&self) -> Vec<InputDecl>;
    fn last_run(&self) -> Option<u32>;
    fn created_this_run(&self) -> bool;
    fn set_created_this_run(&mut self, value: bool);

    /// Runs `change_run` (if the run number differs from the cached one)
    /// followed by `process`, storing the result internally.
    fn run_process(&mut self, host: &dyn FactoryHost) -> Result<(), FactoryError>;

    /// Returns the cached output as a type-erased `Arc`. Panics if called
    /// before `run_process`/`insert_erased` has populated the output —
    /// `FactorySet` never calls this on a factory that hasn't reached
    /// `Processed`/`Inserted`.
    fn output_any(&self) -> Arc<dyn Any + Send + Sync>;

    fn insert_erased(&mut self, objects: Arc<dyn Any + Send + Sync>) -> Result<(), FactoryError>;

    /// Clears cached output and returns status to `Unprocessed`, unless
    /// `flags().persistent` is set, in which case this is a no-op (§4.2).
    fn reset(&mut self);
}

/// The concrete, typed wrapper around a [`FactoryLogic`] implementation.
pub struct TypedFactory<T, L> {
    label: String,
    logic: L,
    status: FactoryStatus,
    last_run: Option<u32>,
    created_this_run: bool,
    output: Option<Arc<Vec<T>>>,
}

impl<T, L> TypedFactory<T, L> {
    pub fn new(label: impl Into<String>, logic: L) -> Self {
        Self {
            label: label.into(),
            logic,
            status: FactoryStatus::Uninit,
            last_run: None,
            created_this_run: true,
            output: None,
        }
    }
}

impl<T, L> AnyFactory for TypedFactory<T, L>
where
    T: 'static + Send + Sync,
    L: FactoryLogic<T> + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn status(&self) -> FactoryStatus {
        self.status
    }

    fn flags(&self) -> FactoryFlags {
        self.logic.flags()
    }

    fn inputs(&self) -> Vec<InputDecl> {
        self.logic.inputs()
    }

    fn last_run(&self) -> Option<u32> {
        self.last_run
    }

    fn created_this_run(&self) -> bool {
        self.created_this_run
    }

    fn set_created_this_run(&mut self, value: bool) {
        self.created_this_run = value;
    }

    fn run_process(&mut self, host: &dyn FactoryHost) -> Result<(), FactoryError> {
        if self.status == FactoryStatus::Uninit {
            self.status = FactoryStatus::Unprocessed;
        }
        let run_number = host.run_number();
        if self.last_run != Some(run_number) {
            self.logic.change_run(run_number)?;
            self.last_run = Some(run_number);
        }
        let output = self.logic.process(host)?;
        self.output = Some(Arc::new(output));
        self.status = FactoryStatus::Processed;
        self.created_this_run = false;
        Ok(())
    }

    fn output_any(&self) -> Arc<dyn Any + Send + Sync> {
        self.output
            .clone()
            .expect("output_any called before Process/Insert populated it")
    }

    fn insert_erased(&mut self, objects: Arc<dyn Any + Send + Sync>) -> Result<(), FactoryError> {
        let typed = objects
            .downcast::<Vec<T>>()
            .unwrap_or_else(|_| panic!("type mismatch inserting into factory {}", self.type_name()));
        self.output = Some(typed);
        self.status = FactoryStatus::Inserted;
        self.created_this_run = false;
        Ok(())
    }

    fn reset(&mut self) {
        if self.logic.flags().persistent {
            return;
        }
        self.output = None;
        self.status = FactoryStatus::Unprocessed;
    }
}

#[cfg(test)]
#[path = "typed.test.rs"]
mod tests;
