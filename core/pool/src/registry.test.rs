use super::*;
use pretty_assertions::assert_eq;

#[test]
fn release_chain_recycles_every_level_once_unshared() {
    let mut registry = PoolRegistry::new();
    let run_pool = Arc::new(EventPool::new(EventLevel::Run, 1, Vec::new()).expect("run pool"));
    let phys_pool = Arc::new(EventPool::new(EventLevel::PhysicsEvent, 1, Vec::new()).expect("phys pool"));
    registry.insert(run_pool.clone());
    registry.insert(phys_pool.clone());

    let run_event = run_pool.acquire().expect("acquire run");
    let phys_event = phys_pool.acquire().expect("acquire phys");
    // Re-stamp the physics event to carry the run event as its parent,
    // mirroring what the multi-level coordinator does at emission time.
    let mut owned = Arc::try_unwrap(phys_event).unwrap_or_else(|_| panic!("sole owner"));
    owned.restamp(1, 0, 0, false, 0, Some(run_event.clone()));
    let phys_event = Arc::new(owned);

    assert_eq!(run_pool.in_flight(), 1);
    assert_eq!(phys_pool.in_flight(), 1);

    // The run pool's own forwarding handle is still outstanding, so
    // releasing just the physics event must not recycle the run event yet.
    registry.release_chain(phys_event);
    assert_eq!(phys_pool.in_flight(), 0, "physics event recycles immediately");
    assert_eq!(run_pool.in_flight(), 1, "run event still held by run_event binding");

    registry.release_chain(run_event);
    assert_eq!(run_pool.in_flight(), 0);
}

#[test]
fn release_chain_on_unknown_level_is_a_no_op() {
    let registry = PoolRegistry::new();
    let event = Arc::new(Event::new_empty(EventLevel::None));
    registry.release_chain(event);
}
