//! FIFO work queue with bounded parallelism and failure isolation.
//!
//! A `WorkQueue` accepts zero-argument asynchronous jobs and runs them on a
//! dedicated scheduler task. The scheduler is woken by two events only: a new
//! submission and the settlement of a running job. All bookkeeping (pending
//! items, running count, run state) lives behind one `parking_lot::Mutex` so a
//! dequeue and its slot reservation are a single critical section; two
//! settlements can never both claim the same free slot.
//!
//! Jobs are never invoked from inside [`WorkQueue::submit`]. The first dispatch
//! attempt always happens on the scheduler task, so callers can finish their
//! own bookkeeping before any job side effect occurs.
//!
//! # Example
//!
//! ```rust,ignore
//! use emulator_work_queue::core::{ExecutionMode, WorkQueue};
//!
//! let queue = WorkQueue::new(ExecutionMode::Auto, Some(10))?;
//! queue.start();
//! queue.submit(|| async {
//!     invoke_trigger().await?;
//!     Ok(())
//! });
//! let state = queue.get_state();
//! tracing::info!(running = state.running_count, queued = state.queued_count, "load");
//! queue.stop();
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::WorkQueueConfig;
use crate::core::mode::DEFAULT_MAX_PARALLEL_WORK;
use crate::core::work::{Work, WorkId, WorkItem, WorkOutcome};
use crate::core::{ExecutionMode, QueueError};
use crate::runtime::TokioSpawner;

/// Abstraction for spawning the scheduler and dispatched jobs on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Lifecycle flag controlling whether the scheduler dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No dispatch happens; submissions are still accepted.
    Stopped,
    /// The scheduler dispatches queued items as slots free up.
    Running,
}

/// Instantaneous load snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueState {
    /// Items dispatched and not yet settled.
    pub running_count: usize,
    /// Items waiting for dispatch.
    pub queued_count: usize,
}

/// Cumulative counters plus the current load, for observability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    /// Scheduling mode.
    pub mode: ExecutionMode,
    /// Effective concurrency limit.
    pub concurrency_limit: usize,
    /// Current load.
    pub state: QueueState,
    /// Items ever submitted.
    pub submitted: u64,
    /// Items handed to the runtime.
    pub dispatched: u64,
    /// Items that settled successfully.
    pub succeeded: u64,
    /// Items that settled with an error or a panic.
    pub failed: u64,
    /// Items dropped without running by `stop()` or teardown.
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: u64,
    dispatched: u64,
    succeeded: u64,
    failed: u64,
    discarded: u64,
}

/// State guarded by the queue mutex.
struct Inner {
    pending: VecDeque<WorkItem>,
    running: usize,
    run_state: RunState,
    /// Bumped on every start and stop so a stale scheduler task exits.
    epoch: u64,
    /// Wake signal of the current scheduler task, present while running.
    wake: Option<Arc<Notify>>,
    counters: Counters,
}

impl Inner {
    fn state(&self) -> QueueState {
        QueueState {
            running_count: self.running,
            queued_count: self.pending.len(),
        }
    }
}

struct Shared {
    mode: ExecutionMode,
    limit: usize,
    next_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl Shared {
    /// Reserve slots for as many head items as the limit allows.
    ///
    /// Returns `None` once this scheduler's run has ended.
    fn take_ready(&self, epoch: u64) -> Option<(Vec<WorkItem>, QueueState)> {
        let mut inner = self.inner.lock();
        if inner.run_state != RunState::Running || inner.epoch != epoch {
            return None;
        }
        let mut batch = Vec::new();
        while inner.running < self.limit {
            let Some(item) = inner.pending.pop_front() else {
                break;
            };
            inner.running += 1;
            inner.counters.dispatched += 1;
            batch.push(item);
        }
        Some((batch, inner.state()))
    }

    fn settle(&self, id: WorkId, outcome: WorkOutcome) {
        let (state, wake) = {
            let mut inner = self.inner.lock();
            debug_assert!(inner.running > 0, "settled more items than were dispatched");
            inner.running = inner.running.saturating_sub(1);
            if outcome.is_success() {
                inner.counters.succeeded += 1;
            } else {
                inner.counters.failed += 1;
            }
            (inner.state(), inner.wake.clone())
        };

        match outcome {
            WorkOutcome::Succeeded => {
                debug!(work_id = id, ?state, "work finished");
            }
            WorkOutcome::Failed(err) => {
                debug!(work_id = id, error = %err, ?state, "work failed; continuing");
            }
            WorkOutcome::Panicked(msg) => {
                warn!(work_id = id, panic = %msg, ?state, "work panicked; continuing");
            }
        }

        if let Some(wake) = wake {
            wake.notify_one();
        }
    }

    /// Stop dispatching and drop everything still queued. Returns the number
    /// of discarded items, or `None` if the queue was already stopped.
    fn halt(&self) -> Option<usize> {
        let (discarded, wake) = {
            let mut inner = self.inner.lock();
            if inner.run_state == RunState::Stopped {
                return None;
            }
            inner.run_state = RunState::Stopped;
            inner.epoch += 1;
            let discarded = std::mem::take(&mut inner.pending);
            inner.counters.discarded += discarded.len() as u64;
            (discarded, inner.wake.take())
        };
        if let Some(wake) = wake {
            wake.notify_one();
        }
        // Dropped outside the lock: item destructors may be arbitrary user code.
        let count = discarded.len();
        drop(discarded);
        Some(count)
    }
}

/// Cooperative scheduler running submitted jobs in FIFO order.
///
/// `Auto` mode keeps up to the concurrency limit in flight; `Sequential`
/// starts each item only after the previous one settled. Job failures,
/// including panics, are logged and swallowed.
///
/// Dropping the queue stops it and discards queued items. Items already
/// running continue until they settle.
pub struct WorkQueue<S = TokioSpawner> {
    shared: Arc<Shared>,
    spawner: S,
}

impl WorkQueue<TokioSpawner> {
    /// Create a stopped queue bound to the current tokio runtime.
    ///
    /// `max_parallel_work` is honored in `Auto` mode only and defaults to
    /// [`DEFAULT_MAX_PARALLEL_WORK`]; `Sequential` always runs one item.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Configuration`] for an explicit limit of zero in `Auto` mode
    /// - [`QueueError::NoRuntime`] when called outside a tokio runtime
    pub fn new(mode: ExecutionMode, max_parallel_work: Option<usize>) -> Result<Self, QueueError> {
        let limit = mode.resolve_limit(max_parallel_work, DEFAULT_MAX_PARALLEL_WORK)?;
        Ok(Self::build(mode, limit, TokioSpawner::current()?))
    }

    /// Create a stopped queue from configuration, bound to the current runtime.
    ///
    /// # Errors
    ///
    /// Same as [`WorkQueue::new`].
    pub fn from_config(cfg: &WorkQueueConfig) -> Result<Self, QueueError> {
        let limit = cfg.concurrency_limit()?;
        Ok(Self::build(cfg.mode, limit, TokioSpawner::current()?))
    }
}

impl<S> WorkQueue<S> {
    /// Create a stopped queue that spawns through `spawner`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Configuration`] for an explicit limit of zero in
    /// `Auto` mode.
    pub fn with_spawner(
        mode: ExecutionMode,
        max_parallel_work: Option<usize>,
        spawner: S,
    ) -> Result<Self, QueueError> {
        let limit = mode.resolve_limit(max_parallel_work, DEFAULT_MAX_PARALLEL_WORK)?;
        Ok(Self::build(mode, limit, spawner))
    }

    /// Create a stopped queue from configuration with an explicit spawner.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Configuration`] when the configuration is invalid.
    pub fn from_config_with_spawner(cfg: &WorkQueueConfig, spawner: S) -> Result<Self, QueueError> {
        let limit = cfg.concurrency_limit()?;
        Ok(Self::build(cfg.mode, limit, spawner))
    }

    fn build(mode: ExecutionMode, limit: usize, spawner: S) -> Self {
        debug!(%mode, limit, "work queue created");
        Self {
            shared: Arc::new(Shared {
                mode,
                limit,
                next_id: AtomicU64::new(0),
                inner: Mutex::new(Inner {
                    pending: VecDeque::new(),
                    running: 0,
                    run_state: RunState::Stopped,
                    epoch: 0,
                    wake: None,
                    counters: Counters::default(),
                }),
            }),
            spawner,
        }
    }

    /// Scheduling mode.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.shared.mode
    }

    /// Effective concurrency limit (always 1 in `Sequential` mode).
    #[must_use]
    pub fn concurrency_limit(&self) -> usize {
        self.shared.limit
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.shared.inner.lock().run_state
    }

    /// Whether the scheduler is dispatching.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Stop dispatching. Idempotent.
    ///
    /// Running items are not interrupted. Items queued at this moment are
    /// dropped without running and produce no completion signal. Items
    /// submitted afterwards stay queued until the next [`WorkQueue::start`].
    pub fn stop(&self) {
        match self.shared.halt() {
            Some(discarded) => {
                let state = self.get_state();
                if discarded > 0 {
                    warn!(discarded, "work queue stopped; discarded queued work");
                }
                info!(running = state.running_count, "work queue stopped");
            }
            None => debug!("work queue already stopped"),
        }
    }

    /// Append a job to the tail of the queue and return immediately.
    ///
    /// The job is never invoked here, even when a slot is free; dispatch
    /// happens later on the scheduler task. Accepted in any run state. A
    /// job's error is logged and discarded, never returned to the caller.
    pub fn submit<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.enqueue(WorkItem::from_fn(id, job));
    }

    /// Append a structured [`Work`] item. Same contract as [`WorkQueue::submit`].
    pub fn submit_work<W: Work>(&self, work: W) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.enqueue(WorkItem::from_work(id, work));
    }

    fn enqueue(&self, item: WorkItem) {
        let id = item.id();
        let (state, wake) = {
            let mut inner = self.shared.inner.lock();
            inner.pending.push_back(item);
            inner.counters.submitted += 1;
            (inner.state(), inner.wake.clone())
        };
        debug!(work_id = id, ?state, "work submitted");
        if let Some(wake) = wake {
            wake.notify_one();
        }
    }

    /// Snapshot of the running and queued counts.
    #[must_use]
    pub fn get_state(&self) -> QueueState {
        self.shared.inner.lock().state()
    }

    /// Cumulative counters and current load.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let inner = self.shared.inner.lock();
        QueueStats {
            mode: self.shared.mode,
            concurrency_limit: self.shared.limit,
            state: inner.state(),
            submitted: inner.counters.submitted,
            dispatched: inner.counters.dispatched,
            succeeded: inner.counters.succeeded,
            failed: inner.counters.failed,
            discarded: inner.counters.discarded,
        }
    }
}

impl<S> WorkQueue<S>
where
    S: Spawn + Clone + Send + 'static,
{
    /// Start the scheduler. Idempotent.
    ///
    /// Items already queued (for example, submitted while stopped) become
    /// eligible for dispatch.
    pub fn start(&self) {
        let (epoch, wake) = {
            let mut inner = self.shared.inner.lock();
            if inner.run_state == RunState::Running {
                debug!("work queue already running");
                return;
            }
            inner.run_state = RunState::Running;
            inner.epoch += 1;
            let wake = Arc::new(Notify::new());
            inner.wake = Some(Arc::clone(&wake));
            (inner.epoch, wake)
        };

        info!(
            mode = %self.shared.mode,
            limit = self.shared.limit,
            "work queue started"
        );
        self.spawner.spawn(run_scheduler(
            Arc::clone(&self.shared),
            self.spawner.clone(),
            epoch,
            wake,
        ));
    }
}

impl<S> Drop for WorkQueue<S> {
    fn drop(&mut self) {
        if let Some(discarded) = self.shared.halt() {
            if discarded > 0 {
                warn!(discarded, "work queue dropped; discarded queued work");
            }
        } else {
            let mut inner = self.shared.inner.lock();
            let discarded = inner.pending.len();
            inner.counters.discarded += discarded as u64;
            let pending = std::mem::take(&mut inner.pending);
            drop(inner);
            drop(pending);
            if discarded > 0 {
                debug!(discarded, "work queue dropped; discarded work submitted while stopped");
            }
        }
    }
}

impl<S> fmt::Debug for WorkQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("mode", &self.shared.mode)
            .field("limit", &self.shared.limit)
            .field("state", &self.get_state())
            .finish_non_exhaustive()
    }
}

/// Scheduler loop for one run of the queue.
///
/// Dispatches whatever the limit allows, then sleeps until a submission or a
/// settlement signals `wake`. Exits once the queue is stopped or restarted.
async fn run_scheduler<S>(shared: Arc<Shared>, spawner: S, epoch: u64, wake: Arc<Notify>)
where
    S: Spawn + Send + 'static,
{
    debug!(epoch, "scheduler loop started");
    while let Some((batch, state)) = shared.take_ready(epoch) {
        if !batch.is_empty() {
            debug!(dispatching = batch.len(), ?state, "dispatching work");
        }
        for item in batch {
            dispatch(&shared, &spawner, item);
        }
        wake.notified().await;
    }
    debug!(epoch, "scheduler loop exited");
}

fn dispatch<S: Spawn>(shared: &Arc<Shared>, spawner: &S, item: WorkItem) {
    let shared = Arc::clone(shared);
    spawner.spawn(async move {
        let id = item.id();
        debug!(work_id = id, "work running");
        let outcome = item.run().await;
        shared.settle(id, outcome);
    });
}
