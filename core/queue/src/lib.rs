//! The bounded, lock-free multi-producer multi-consumer hand-off arrows use
//! to pass events between stages.
//!
//! A `Queue<T>` never preserves FIFO order across producers — callers that
//! need per-item ordering (the ordered-processor discipline in
//! `jana-engine`) impose it above the queue, not inside it. `push`/`pop`
//! never block and never allocate on the hot path; capacity overflow and
//! emptiness are plain return values, not errors, since a scheduler treats
//! both as "come back later" signals rather than failures.

mod queue;

pub use queue::PushError;
pub use queue::Queue;

/// Type-erased occupancy view of a queue, for the status pipe's queue
/// table (§6) — the report only ever needs size/capacity, not the item
/// type, so arrows and the engine can hand around `Arc<dyn QueueInspect>`
/// without naming `T`.
pub trait QueueInspect: Send + Sync {
    fn size(&self) -> usize;
    fn capacity(&self) -> usize;
}

impl<T: Send> QueueInspect for Queue<T> {
    fn size(&self) -> usize {
        Queue::size(self)
    }

    fn capacity(&self) -> usize {
        Queue::capacity(self)
    }
}
