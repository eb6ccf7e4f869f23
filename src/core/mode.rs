//! Execution modes and concurrency limit resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::QueueError;

/// Concurrency limit used in `Auto` mode when none is supplied.
pub const DEFAULT_MAX_PARALLEL_WORK: usize = 50;

/// How a work queue schedules its items.
///
/// The mode only decides the effective concurrency limit; both modes share
/// the same dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Bounded parallelism with a configurable limit.
    #[default]
    Auto,
    /// Strict one-at-a-time execution.
    Sequential,
}

impl ExecutionMode {
    /// Resolve the effective concurrency limit for this mode.
    ///
    /// `Sequential` always yields 1 and ignores `requested`. `Auto` falls back
    /// to `default_limit` when nothing was requested.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Configuration`] when `Auto` is given an explicit
    /// limit of zero, or when the fallback itself is zero.
    pub fn resolve_limit(
        self,
        requested: Option<usize>,
        default_limit: usize,
    ) -> Result<usize, QueueError> {
        match self {
            Self::Sequential => Ok(1),
            Self::Auto => match requested {
                Some(0) => Err(QueueError::Configuration(
                    "cannot run with less than 1 parallel worker (max_parallel_work=0)".into(),
                )),
                Some(limit) => Ok(limit),
                None if default_limit == 0 => Err(QueueError::Configuration(
                    "default parallel worker count must be greater than 0".into(),
                )),
                None => Ok(default_limit),
            },
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sequential" => Ok(Self::Sequential),
            other => Err(QueueError::Configuration(format!(
                "unknown execution mode `{other}` (expected `auto` or `sequential`)"
            ))),
        }
    }
}
