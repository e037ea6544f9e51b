//! [`Engine`]: owns workers and the topology lifecycle, aggregates metrics,
//! and handles signals/timeouts (§4.6, §4.7, §5, §7).
//!
//! Nothing downstream of `jana-arrow` needs to know about threads at all:
//! this crate is where `std::thread::spawn` actually gets called, and
//! where the monitor thread that watches for timeouts, repeated `SIGINT`,
//! and status-pipe requests lives.

mod config;
mod error;
mod registry;
mod signal;
mod state;
mod status_pipe;
mod topology_builder;
mod worker;

pub use config::EngineConfig;
pub use error::EngineError;
pub use registry::ComponentRegistry;
pub use signal::SignalState;
pub use state::EngineState;
pub use worker::WorkerStatus;

use jana_arrow::ArrowError;
use jana_arrow::Topology;
use jana_error::ErrorExt;
use jana_error::StatusCode;
use jana_event::Event;
use jana_otel::ArrowReport;
use jana_otel::QueueReport;
use jana_otel::StatusReport;
use jana_otel::WorkerReport;
use jana_queue::Queue;
use jana_scheduler::Scheduler;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::InterruptedSnafu;
use crate::error::InvalidStateSnafu;
use crate::error::TimeoutSnafu;

/// The live, running half of the engine: present from a successful
/// `Initialize` until `Stop`/`Quit` tears it down. Kept separate from
/// [`Engine`] itself so `Initialize` can be called again after a full
/// `Stop` without `Engine` needing an extra "has this ever run" flag.
struct Session {
    topology: Arc<Topology>,
    scheduler: Arc<Scheduler>,
    queues: Vec<(String, Arc<Queue<Arc<Event>>>)>,
    should_stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    workers: Vec<JoinHandle<Option<ArrowError>>>,
    worker_statuses: Vec<Arc<WorkerStatus>>,
    monitor: Option<JoinHandle<()>>,
    fatal: Arc<Mutex<Option<EngineError>>>,
}

/// Owns the worker pool and the topology's lifecycle (§4.6 "Worker and
/// Execution Engine"). One `Engine` per process is the typical case; a
/// CLI's `main` registers components via [`Engine::registry`], then calls
/// `Initialize`, `Run`, and eventually `Stop`.
pub struct Engine {
    config: EngineConfig,
    registry: ComponentRegistry,
    state: Mutex<EngineState>,
    session: Mutex<Option<Session>>,
    exit_code: AtomicI32,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: ComponentRegistry::new(),
            state: Mutex::new(EngineState::Unopened),
            session: Mutex::new(None),
            exit_code: AtomicI32::new(StatusCode::Success.exit_code()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registration surface a CLI or embedding application populates
    /// before calling [`Engine::initialize`].
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock().expect("engine state mutex poisoned")
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::Acquire)
    }

    /// Builds the topology from whatever was registered, opens every
    /// arrow (a source's first `EventSource`, a tap's processors' `init`),
    /// and readies a [`Scheduler`] sized for `self.config().nthreads`
    /// (§4.6 `Initialize()`).
    pub fn initialize(&self, run_number: u32) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("engine state mutex poisoned");
        if !state.can_initialize() {
            return InvalidStateSnafu { operation: "Initialize", state: *state }.fail();
        }

        SignalState::install();

        let built = topology_builder::build(&self.config, &self.registry, run_number)?;
        built.topology.open_all()?;

        let worker_count = self.config.nthreads.max(1);
        let scheduler = Arc::new(Scheduler::new(&built.topology, worker_count));

        *self.session.lock().expect("engine session mutex poisoned") = Some(Session {
            topology: Arc::new(built.topology),
            scheduler,
            queues: built.queues,
            should_stop: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            worker_statuses: Vec::new(),
            monitor: None,
            fatal: Arc::new(Mutex::new(None)),
        });

        *state = EngineState::Initialized;
        tracing::info!(run_number, worker_count, "engine initialized");
        Ok(())
    }

    /// Starts `self.config().nthreads` worker threads plus the monitor
    /// thread. Idempotent: calling `run` again while already `Running` is
    /// a no-op (§4.6 `Run(nthreads)`).
    pub fn run(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("engine state mutex poisoned");
        if *state == EngineState::Running {
            return Ok(());
        }
        if !state.can_run() {
            return InvalidStateSnafu { operation: "Run", state: *state }.fail();
        }

        let mut session_guard = self.session.lock().expect("engine session mutex poisoned");
        let session = session_guard.as_mut().expect("Running requires a session built by Initialize");

        if session.workers.is_empty() {
            for worker_id in 0..session.scheduler.worker_count() {
                self.spawn_worker(session, worker_id);
            }
            self.spawn_monitor(session);
        } else {
            session.paused.store(false, Ordering::Release);
        }

        *state = EngineState::Running;
        tracing::info!(worker_count = session.workers.len(), "engine running");
        Ok(())
    }

    fn spawn_worker(&self, session: &mut Session, worker_id: usize) {
        let status = Arc::new(WorkerStatus::new());
        let scheduler = session.scheduler.clone();
        let should_stop = session.should_stop.clone();
        let paused = session.paused.clone();
        let worker_status = status.clone();
        let handle = std::thread::Builder::new()
            .name(format!("jana-worker-{worker_id}"))
            .spawn(move || worker::run(worker_id, scheduler, worker_status, should_stop, paused))
            .expect("spawning a worker thread");
        session.worker_statuses.push(status);
        session.workers.push(handle);
    }

    fn spawn_monitor(&self, session: &mut Session) {
        let should_stop = session.should_stop.clone();
        let worker_statuses = session.worker_statuses.clone();
        let topology = session.topology.clone();
        let fatal = session.fatal.clone();
        let per_event_timeout = self.config.per_event_timeout;
        let monitor_interval = self.config.monitor_interval;
        let status_pipe_path = self.config.status_pipe_path.clone();
        let queues = session.queues.clone();

        if let Some(path) = &status_pipe_path {
            if let Err(err) = status_pipe::ensure_fifo(path) {
                tracing::warn!(error = %err, path = %path.display(), "could not create status pipe");
            }
        }

        let handle = std::thread::Builder::new()
            .name("jana-monitor".to_string())
            .spawn(move || {
                monitor_loop(
                    should_stop,
                    worker_statuses,
                    topology,
                    fatal,
                    per_event_timeout,
                    monitor_interval,
                    status_pipe_path,
                    queues,
                )
            })
            .expect("spawning the monitor thread");
        session.monitor = Some(handle);
    }

    /// Sets a flag that causes workers to finish their current step, then
    /// idle rather than requesting new work (§4.6 `Pause()`).
    pub fn pause(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("engine state mutex poisoned");
        if !state.can_pause() {
            return InvalidStateSnafu { operation: "Pause", state: *state }.fail();
        }
        let session_guard = self.session.lock().expect("engine session mutex poisoned");
        let session = session_guard.as_ref().expect("Pause requires a session");
        session.paused.store(true, Ordering::Release);
        *state = EngineState::Paused;
        Ok(())
    }

    /// Resumes a paused engine without rebuilding workers or the topology.
    pub fn resume(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("engine state mutex poisoned");
        if !state.can_resume() {
            return InvalidStateSnafu { operation: "Resume", state: *state }.fail();
        }
        let session_guard = self.session.lock().expect("engine session mutex poisoned");
        let session = session_guard.as_ref().expect("Resume requires a session");
        session.paused.store(false, Ordering::Release);
        *state = EngineState::Running;
        Ok(())
    }

    /// Grows the worker pool to `n` threads without tearing the topology
    /// down (§4.6 `Scale(n)`). Shrinking is not supported mid-run: a
    /// worker has no cancellation point inside an in-progress `execute`
    /// step, so the only safe way to reduce `nthreads` is `Stop` then
    /// `Run` again with a smaller [`EngineConfig::nthreads`] — see
    /// `DESIGN.md` for the Open Question this resolves.
    pub fn scale(&self, n: usize) -> Result<(), EngineError> {
        let state = self.state.lock().expect("engine state mutex poisoned");
        if !state.can_scale() {
            return InvalidStateSnafu { operation: "Scale", state: *state }.fail();
        }
        let mut session_guard = self.session.lock().expect("engine session mutex poisoned");
        let session = session_guard.as_mut().expect("Scale requires a session");

        while session.workers.len() < n {
            let worker_id = session.scheduler.register_worker();
            self.spawn_worker(session, worker_id);
        }
        Ok(())
    }

    /// Lets the topology drain naturally — sources stop emitting once
    /// their limits/sources are exhausted, events already in flight finish
    /// — then joins workers and runs every source's and processor's
    /// `Finalize`, in the order they were registered (§4.6 `Stop(finish)`).
    /// When `finish` is `false`, workers are signalled to exit immediately
    /// without waiting for the topology to reach [`Topology::all_finished`].
    pub fn stop(&self, finish: bool) -> Result<(), EngineError> {
        {
            let state = self.state.lock().expect("engine state mutex poisoned");
            if !state.can_stop() {
                return InvalidStateSnafu { operation: "Stop", state: *state }.fail();
            }
        }

        let mut session_guard = self.session.lock().expect("engine session mutex poisoned");
        let session = session_guard.as_mut().expect("Stop requires a session");

        if finish {
            while !session.topology.all_finished() {
                std::thread::sleep(self.config.monitor_interval);
            }
        }
        session.should_stop.store(true, Ordering::Release);

        self.join_and_finalize(session)?;
        *self.state.lock().expect("engine state mutex poisoned") = EngineState::Finished;
        Ok(())
    }

    /// Hard stop: workers exit at their next checkin regardless of
    /// whether the topology has finished (§4.6 `Quit(skip_join)`). Still
    /// runs `Finalize` on every component the topology reached, since it
    /// was already `Initialized` (§5 "Forced" cancellation).
    pub fn quit(&self, skip_join: bool) -> Result<(), EngineError> {
        let mut session_guard = self.session.lock().expect("engine session mutex poisoned");
        let Some(session) = session_guard.as_mut() else {
            *self.state.lock().expect("engine state mutex poisoned") = EngineState::Finished;
            return Ok(());
        };
        session.should_stop.store(true, Ordering::Release);

        if !skip_join {
            self.join_and_finalize(session)?;
        } else {
            let _ = session.topology.close_all();
        }
        *self.state.lock().expect("engine state mutex poisoned") = EngineState::Finished;
        Ok(())
    }

    fn join_and_finalize(&self, session: &mut Session) -> Result<(), EngineError> {
        for handle in session.workers.drain(..) {
            if let Ok(Some(err)) = handle.join() {
                let mut fatal = session.fatal.lock().expect("fatal-error mutex poisoned");
                if fatal.is_none() {
                    *fatal = Some(EngineError::ArrowRaised { arrow: err.to_string(), source: err });
                }
            }
        }
        if let Some(monitor) = session.monitor.take() {
            let _ = monitor.join();
        }

        session.topology.close_all()?;

        let fatal = session.fatal.lock().expect("fatal-error mutex poisoned").take();
        if let Some(err) = fatal {
            self.exit_code.store(err.status_code().exit_code(), Ordering::Release);
            tracing::error!(error = %err, "engine stopped due to a fatal error");
            return Err(err);
        }
        self.exit_code.store(StatusCode::Success.exit_code(), Ordering::Release);
        Ok(())
    }

    /// A point-in-time snapshot for the status pipe (§6 "Status pipe"),
    /// also usable directly by an embedding application that wants the
    /// same data without going through a FIFO.
    pub fn status_report(&self) -> StatusReport {
        let session_guard = self.session.lock().expect("engine session mutex poisoned");
        let state = self.state();
        match session_guard.as_ref() {
            Some(session) => build_status_report(state, &session.topology, &session.queues, &session.worker_statuses),
            None => StatusReport {
                engine_state: format!("{state:?}"),
                arrows: Vec::new(),
                queues: Vec::new(),
                workers: Vec::new(),
            },
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn monitor_loop(
    should_stop: Arc<AtomicBool>,
    worker_statuses: Vec<Arc<WorkerStatus>>,
    topology: Arc<Topology>,
    fatal: Arc<Mutex<Option<EngineError>>>,
    per_event_timeout: Option<Duration>,
    monitor_interval: Duration,
    status_pipe_path: Option<PathBuf>,
    queues: Vec<(String, Arc<Queue<Arc<Event>>>)>,
) {
    loop {
        std::thread::sleep(monitor_interval);
        if should_stop.load(Ordering::Acquire) {
            return;
        }

        if SignalState::sigint_count() >= 3 {
            tracing::warn!("three consecutive SIGINT: escalating to immediate exit");
            *fatal.lock().expect("fatal-error mutex poisoned") = Some(InterruptedSnafu.build());
            should_stop.store(true, Ordering::Release);
            return;
        }

        if let Some(deadline) = per_event_timeout {
            for (worker_id, status) in worker_statuses.iter().enumerate() {
                if let Some((arrow, elapsed)) = status.current() {
                    if elapsed > deadline {
                        tracing::error!(worker_id, arrow = %arrow, elapsed_ms = elapsed.as_millis(), "per-event deadline exceeded");
                        *fatal.lock().expect("fatal-error mutex poisoned") = Some(
                            TimeoutSnafu {
                                worker_id,
                                arrow,
                                elapsed_ms: elapsed.as_millis(),
                                deadline_ms: deadline.as_millis(),
                            }
                            .build(),
                        );
                        should_stop.store(true, Ordering::Release);
                        return;
                    }
                }
            }
        }

        if SignalState::take_status_request() {
            if let Some(path) = &status_pipe_path {
                let report = build_status_report(EngineState::Running, &topology, &queues, &worker_statuses);
                match report.to_pretty_json() {
                    Ok(body) => {
                        if let Err(err) = status_pipe::try_write(path, &body) {
                            tracing::warn!(error = %err, "writing status report failed");
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "serializing status report failed"),
                }
            }
        }

        if topology.all_finished() {
            tracing::debug!("topology fully drained; stopping workers");
            should_stop.store(true, Ordering::Release);
            return;
        }
    }
}

fn build_status_report(
    state: EngineState,
    topology: &Topology,
    queues: &[(String, Arc<Queue<Arc<Event>>>)],
    worker_statuses: &[Arc<WorkerStatus>],
) -> StatusReport {
    let arrows = topology
        .arrows()
        .iter()
        .map(|arrow| ArrowReport {
            name: arrow.name().to_string(),
            kind: arrow.kind().to_string(),
            state: arrow.state().to_string(),
            thread_count: arrow.active_workers(),
            metrics: arrow.metrics().snapshot(),
        })
        .collect();

    let queue_reports = queues
        .iter()
        .map(|(name, queue)| QueueReport { name: name.clone(), size: queue.size(), capacity: queue.capacity() })
        .collect();

    let workers = worker_statuses
        .iter()
        .enumerate()
        .map(|(worker_id, status)| {
            let current = status.current();
            WorkerReport {
                worker_id,
                current_arrow: current.as_ref().map(|(name, _)| name.clone()),
                current_event_index: None,
                stack_trace: current.as_ref().and_then(|_| jana_otel::capture_stack()),
            }
        })
        .collect();

    StatusReport { engine_state: format!("{state:?}"), arrows, queues: queue_reports, workers }
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
