//! Recyclable event pools (§3 EventPool, §4.2).
//!
//! One `EventPool` exists per event level. It hands out pre-allocated
//! `Event`s wrapped in `Arc` so arrows can share them across threads, and
//! reclaims them once the last shared handle is released, resetting their
//! factory sets for reuse. This crate merges the spec's separate
//! "EventPool" and "FactorySet pool" into one type: since `Event` owns its
//! `FactorySet` outright (rather than attaching a separately-pooled one),
//! recycling the event recycles its factory set for free.

mod error;
mod pool;
mod registry;

pub use error::PoolError;
pub use pool::EventPool;
pub use registry::PoolRegistry;
