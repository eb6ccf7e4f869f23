//! Configuration models for work queues.

pub mod queue;

pub use queue::{QueueSetConfig, WorkQueueConfig, MODE_ENV, PARALLEL_ENV};
