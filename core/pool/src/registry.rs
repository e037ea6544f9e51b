//! [`PoolRegistry`]: one [`EventPool`] per level, plus the chained-release
//! helper the multi-level coordinator and `TapArrow` both need (§4.2,
//! §4.4.4).

use crate::pool::EventPool;
use jana_event::Event;
use jana_factory::EventLevel;
use std::collections::HashMap;
use std::sync::Arc;

/// All the event pools live in a topology, keyed by level. A single-level
/// topology has exactly one entry, keyed `EventLevel::None` by convention.
#[derive(Default)]
pub struct PoolRegistry {
    pools: HashMap<EventLevel, Arc<EventPool>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pool: Arc<EventPool>) {
        self.pools.insert(pool.level(), pool);
    }

    pub fn get(&self, level: EventLevel) -> Option<&Arc<EventPool>> {
        self.pools.get(&level)
    }

    pub fn levels(&self) -> impl Iterator<Item = EventLevel> + '_ {
        self.pools.keys().copied()
    }

    /// Releases `event`'s handle, and if that was the last handle on it,
    /// walks the parent chain releasing each ancestor's handle too — the
    /// child was one of possibly several holders keeping that ancestor
    /// alive (the others being the multi-level coordinator's forwarding
    /// pool slot, and any sibling descendants).
    pub fn release_chain(&self, mut event: Arc<Event>) {
        loop {
            let level = event.level();
            let Some(pool) = self.pools.get(&level) else {
                return;
            };
            match pool.release(event) {
                Some(parent) => event = parent,
                None => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
