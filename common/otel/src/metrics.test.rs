use super::*;
use std::time::Duration;

#[test]
fn snapshot_of_fresh_metrics_is_zero() {
    let metrics = ArrowMetrics::new();
    let snap = metrics.snapshot();
    assert_eq!(snap.events_completed, 0);
    assert_eq!(snap.steps_run, 0);
    assert_eq!(snap.avg_throughput, 0.0);
}

#[test]
fn record_step_accumulates_across_calls() {
    let metrics = ArrowMetrics::new();
    metrics.record_step(
        5,
        Duration::from_secs(1),
        Duration::from_millis(100),
        Duration::from_millis(10),
    );
    metrics.record_step(
        5,
        Duration::from_secs(1),
        Duration::from_millis(100),
        Duration::from_millis(10),
    );
    let snap = metrics.snapshot();
    assert_eq!(snap.events_completed, 10);
    assert_eq!(snap.steps_run, 2);
    assert!(snap.avg_throughput > 0.0);
    assert!((snap.avg_latency_nanos - 100_000_000.0).abs() < 1.0);
}

#[test]
fn concurrent_updates_do_not_lose_counts() {
    use std::sync::Arc;
    use std::thread;

    let metrics = Arc::new(ArrowMetrics::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.record_step(1, Duration::from_millis(1), Duration::from_micros(1), Duration::from_micros(1));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(metrics.snapshot().events_completed, 8000);
    assert_eq!(metrics.snapshot().steps_run, 8000);
}
