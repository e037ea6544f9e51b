use super::*;
use pretty_assertions::assert_eq;

#[test]
fn acquire_and_release_round_trips_capacity() {
    let pool = EventPool::new(EventLevel::None, 2, Vec::new()).expect("pool");
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.in_flight(), 0);

    let a = pool.acquire().expect("first acquire");
    let b = pool.acquire().expect("second acquire");
    assert_eq!(pool.in_flight(), 2);
    assert!(pool.acquire().is_none(), "pool exhausted at capacity 2");

    assert!(pool.release(a).is_none());
    assert_eq!(pool.in_flight(), 1);
    assert!(pool.release(b).is_none());
    assert_eq!(pool.in_flight(), 0);

    assert!(pool.acquire().is_some());
}

#[test]
fn exhausted_pool_rejects_zero_capacity() {
    let err = EventPool::new(EventLevel::None, 0, Vec::new()).unwrap_err();
    assert_eq!(err.status_code_for_test(), "Exhausted");
}

#[test]
fn release_with_shared_handle_is_a_no_op() {
    let pool = EventPool::new(EventLevel::None, 1, Vec::new()).expect("pool");
    let event = pool.acquire().expect("acquire");
    let clone = event.clone();

    assert!(pool.release(event).is_none());
    assert_eq!(pool.in_flight(), 1, "still shared via `clone`");

    assert!(pool.release(clone).is_none());
    assert_eq!(pool.in_flight(), 0);
}

#[test]
fn release_returns_parent_handle_for_chained_release() {
    let pool = EventPool::new(EventLevel::None, 1, Vec::new()).expect("pool");
    let parent = Arc::new(Event::builder().level(EventLevel::Run).build());
    let mut child = Event::new_empty(EventLevel::None);
    child.restamp(1, 0, 0, false, 0, Some(parent.clone()));
    let child = Arc::new(child);

    // Pool-managed acquire isn't used here since we hand-built the child;
    // exercise `release` directly against a pool at the child's level.
    let returned_parent = pool.release(child).expect("last handle, should recycle");
    assert!(Arc::ptr_eq(&returned_parent, &parent));
}

#[test]
fn scale_up_grows_capacity_without_losing_idle_events() {
    let pool = EventPool::new(EventLevel::None, 1, Vec::new()).expect("pool");
    let first = pool.acquire().expect("acquire");
    pool.scale_up(2).expect("scale up");
    assert_eq!(pool.capacity(), 3);
    assert!(pool.release(first).is_none());
    assert_eq!(pool.in_flight(), 0);
}

#[test]
fn scale_down_is_always_forbidden() {
    let pool = EventPool::new(EventLevel::None, 1, Vec::new()).expect("pool");
    assert!(pool.scale_down(1).is_err());
}

trait ErrForTest {
    fn status_code_for_test(&self) -> &'static str;
}

impl ErrForTest for PoolError {
    fn status_code_for_test(&self) -> &'static str {
        match self {
            PoolError::Exhausted { .. } => "Exhausted",
            PoolError::DownscaleForbidden { .. } => "DownscaleForbidden",
        }
    }
}
