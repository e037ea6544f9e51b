//! The slot-array queue (§4.1).
//!
//! Each slot has two atomic flags: `write_claimed[i]` (a producer owns slot
//! `i`) and `read_ready[i]` (slot `i` holds a committed item). A producer
//! CAS's `write_claimed` `false -> true` to claim a slot, writes the item,
//! then sets `read_ready`. A consumer mirrors the protocol on `read_ready`:
//! CAS `true -> false`, move the item out, then clear `write_claimed`. The
//! invariant `read_ready[i] => write_claimed[i]` holds throughout because a
//! consumer always clears `read_ready` strictly before clearing
//! `write_claimed`.

use std::cell::UnsafeCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// Returned by [`Queue::push`] when every slot is currently claimed. The
/// item is handed back so the caller can retry or route it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushError<T>(pub T);

struct Slot<T> {
    item: UnsafeCell<Option<T>>,
    write_claimed: AtomicBool,
    read_ready: AtomicBool,
}

/// A bounded, fixed-capacity, lock-free MPMC hand-off.
///
/// Capacity is fixed at construction — it is never reduced while the
/// engine runs (§4.2), and this type does not support resizing at all;
/// `jana-pool` handles "upscaling" by swapping in a freshly-sized `Queue`
/// under a coarse lock reserved for that rare administrative path.
pub struct Queue<T> {
    slots: Box<[Slot<T>]>,
    push_cursor: AtomicUsize,
    pop_cursor: AtomicUsize,
    len_hint: AtomicUsize,
    /// Set by a producer immediately after pushing a barrier event, cleared
    /// once that event has been fully released by every downstream
    /// consumer. Lets a `TapArrow` assert the barrier isolation property
    /// (§8 testable property 5) without needing its own channel back to
    /// the source that emitted the barrier (`JQueueWithBarriers`-style).
    pending_barrier: AtomicBool,
}

// SAFETY: access to each slot's `UnsafeCell` is gated by the
// `write_claimed`/`read_ready` CAS protocol, which admits at most one
// writer and at most one reader per slot at any instant; `T: Send` is
// enough to move items across threads through the array.
unsafe impl<T: Send> Sync for Queue<T> {}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        let slots = (0..capacity)
            .map(|_| Slot {
                item: UnsafeCell::new(None),
                write_claimed: AtomicBool::new(false),
                read_ready: AtomicBool::new(false),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            push_cursor: AtomicUsize::new(0),
            pop_cursor: AtomicUsize::new(0),
            len_hint: AtomicUsize::new(0),
            pending_barrier: AtomicBool::new(false),
        }
    }

    /// Marks that a barrier event is currently somewhere downstream of
    /// this queue, not yet fully released.
    pub fn mark_barrier_pending(&self) {
        self.pending_barrier.store(true, Ordering::Release);
    }

    pub fn clear_barrier_pending(&self) {
        self.pending_barrier.store(false, Ordering::Release);
    }

    pub fn is_barrier_pending(&self) -> bool {
        self.pending_barrier.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate occupancy; useful for status reporting and scheduler
    /// heuristics only — racing pushes/pops can make it stale the instant
    /// it's read.
    pub fn size(&self) -> usize {
        self.len_hint.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Claims the first free slot found scanning from a rotating cursor,
    /// writes `item`, and publishes it. Returns `Err(PushError(item))`
    /// without touching any atomic if every slot is currently claimed.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let capacity = self.slots.len();
        let start = self.push_cursor.fetch_add(1, Ordering::Relaxed) % capacity;
        for offset in 0..capacity {
            let i = (start + offset) % capacity;
            let slot = &self.slots[i];
            if slot
                .write_claimed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                // SAFETY: we just won exclusive write-claim on this slot;
                // no consumer touches `item` until `read_ready` is set.
                unsafe {
                    *slot.item.get() = Some(item);
                }
                slot.read_ready.store(true, Ordering::Release);
                self.len_hint.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
        }
        Err(PushError(item))
    }

    /// Claims the first ready slot found scanning from a rotating cursor
    /// and returns its item, or `None` if no slot is ready.
    pub fn pop(&self) -> Option<T> {
        let capacity = self.slots.len();
        let start = self.pop_cursor.fetch_add(1, Ordering::Relaxed) % capacity;
        for offset in 0..capacity {
            let i = (start + offset) % capacity;
            let slot = &self.slots[i];
            if slot
                .read_ready
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                // SAFETY: we just won exclusive read-claim on this slot;
                // no producer touches `item` until `write_claimed` clears.
                let item = unsafe { (*slot.item.get()).take() };
                slot.write_claimed.store(false, Ordering::Release);
                self.len_hint.fetch_sub(1, Ordering::Relaxed);
                return item;
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "queue.test.rs"]
mod tests;
