//! # Emulator Work Queue
//!
//! An in-process, bounded-concurrency FIFO work queue for local emulators.
//!
//! A cloud-platform emulator turns every simulated function invocation into an
//! asynchronous job. Running all of them at once would swamp the host; running
//! them strictly in order is sometimes required for debugging. This crate
//! provides the scheduler that sits between the two.
//!
//! ## Key Features
//!
//! - **Bounded parallelism**: `Auto` mode keeps at most N jobs in flight
//! - **Sequential mode**: one job at a time, each starting after the previous settles
//! - **FIFO dispatch**: jobs start in submission order; completion order is free
//! - **Deferred dispatch**: `submit` never runs a job inline
//! - **Failure isolation**: errors and panics in jobs are logged and swallowed
//! - **Load snapshots**: `get_state` reports running and queued counts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use emulator_work_queue::config::WorkQueueConfig;
//! use emulator_work_queue::core::{ExecutionMode, WorkQueue};
//!
//! emulator_work_queue::util::init_tracing();
//!
//! // From explicit arguments...
//! let queue = WorkQueue::new(ExecutionMode::Auto, Some(10))?;
//! // ...or from FUNCTIONS_EMULATOR_MODE / FUNCTIONS_EMULATOR_PARALLEL.
//! let queue = WorkQueue::from_config(&WorkQueueConfig::from_env()?)?;
//!
//! queue.start();
//! queue.submit(|| async move {
//!     run_invocation().await?;
//!     Ok(())
//! });
//!
//! let state = queue.get_state();
//! println!("{} running, {} queued", state.running_count, state.queued_count);
//!
//! // Stops dispatch, drops queued work, lets running jobs finish.
//! queue.stop();
//! ```
//!
//! ## Stop semantics
//!
//! `stop()` discards items that are queued at that moment. Items submitted
//! while the queue is stopped are kept and run after the next `start()`.
//! Dropping the queue discards everything still queued.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: the work queue, execution modes, and units of work.
pub mod core;
/// Configuration models for queues and queue sets.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Runtime adapters that host the scheduler.
pub mod runtime;
/// Shared utilities.
pub mod util;
