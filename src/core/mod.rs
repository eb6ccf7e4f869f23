//! Core scheduling abstractions: the work queue, its modes, and units of work.

pub mod error;
pub mod mode;
pub mod work;
pub mod work_queue;

pub use error::{AppResult, QueueError};
pub use mode::{ExecutionMode, DEFAULT_MAX_PARALLEL_WORK};
pub use work::{Work, WorkFuture, WorkId, WorkItem, WorkOutcome};
pub use work_queue::{QueueState, QueueStats, RunState, Spawn, WorkQueue};
