use super::*;
use jana_arrow::ArrowBase;
use jana_arrow::ArrowError;
use jana_arrow::ArrowKind;
use jana_arrow::ArrowState;
use jana_arrow::ArrowStep;

struct OneShotArrow {
    base: ArrowBase,
    calls: std::sync::atomic::AtomicUsize,
}

impl OneShotArrow {
    fn new() -> Self {
        let base = ArrowBase::new("oneshot", ArrowKind::Map, true);
        base.set_state(ArrowState::Running);
        Self { base, calls: std::sync::atomic::AtomicUsize::new(0) }
    }
}

impl ArrowStep for OneShotArrow {
    fn base(&self) -> &ArrowBase {
        &self.base
    }

    fn open(&self) -> Result<(), ArrowError> {
        Ok(())
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n == 0 {
            Ok(StepOutcome::KeepGoing)
        } else {
            self.base.set_state(ArrowState::Finished);
            Ok(StepOutcome::Finished)
        }
    }
}

struct RaisingArrow {
    base: ArrowBase,
}

impl ArrowStep for RaisingArrow {
    fn base(&self) -> &ArrowBase {
        &self.base
    }

    fn open(&self) -> Result<(), ArrowError> {
        Ok(())
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        Err(ArrowError::SourceRaised { name: "raising".to_string(), message: "boom".to_string() })
    }
}

#[test]
fn worker_stops_when_should_stop_flag_is_set() {
    let arrow: Arc<dyn ArrowStep> = Arc::new(OneShotArrow::new());
    let scheduler = Arc::new(Scheduler::from_arrows(vec![arrow], 1));
    let status = Arc::new(WorkerStatus::new());
    let should_stop = Arc::new(AtomicBool::new(false));
    let paused = Arc::new(AtomicBool::new(false));

    let stopper = should_stop.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        stopper.store(true, Ordering::Release);
    });

    let result = run(0, scheduler, status, should_stop, paused);
    handle.join().expect("stopper thread joins");
    assert!(result.is_none());
}

#[test]
fn worker_reports_error_from_a_raising_arrow() {
    let base = ArrowBase::new("raising", ArrowKind::Map, true);
    base.set_state(ArrowState::Running);
    let arrow: Arc<dyn ArrowStep> = Arc::new(RaisingArrow { base });
    let scheduler = Arc::new(Scheduler::from_arrows(vec![arrow], 1));
    let status = Arc::new(WorkerStatus::new());
    let should_stop = Arc::new(AtomicBool::new(false));
    let paused = Arc::new(AtomicBool::new(false));

    let result = run(0, scheduler, status, should_stop, paused);
    assert!(matches!(result, Some(ArrowError::SourceRaised { .. })));
}

#[test]
fn status_tracks_current_arrow_while_executing() {
    let status = WorkerStatus::new();
    assert!(status.current().is_none());
    status.begin("source_1");
    let (name, _elapsed) = status.current().expect("arrow in progress");
    assert_eq!(name, "source_1");
    status.end();
    assert!(status.current().is_none());
}
