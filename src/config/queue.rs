//! Work queue configuration structures.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{ExecutionMode, QueueError, DEFAULT_MAX_PARALLEL_WORK};

/// Environment variable selecting the execution mode (`auto` or `sequential`).
pub const MODE_ENV: &str = "FUNCTIONS_EMULATOR_MODE";
/// Environment variable overriding the `auto` mode concurrency limit.
pub const PARALLEL_ENV: &str = "FUNCTIONS_EMULATOR_PARALLEL";

/// Configuration for a single work queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkQueueConfig {
    /// Scheduling mode.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Concurrency limit for `auto` mode; ignored in `sequential` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_work: Option<usize>,
}

/// A named set of work queues, e.g. one per emulated function trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSetConfig {
    /// Map of queue name to configuration.
    pub queues: HashMap<String, WorkQueueConfig>,
}

impl WorkQueueConfig {
    /// Bounded parallelism with the given limit.
    #[must_use]
    pub const fn auto(max_parallel_work: usize) -> Self {
        Self {
            mode: ExecutionMode::Auto,
            max_parallel_work: Some(max_parallel_work),
        }
    }

    /// Strict one-at-a-time execution.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_parallel_work: None,
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message when `auto` mode is given a limit of zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.mode == ExecutionMode::Auto && self.max_parallel_work == Some(0) {
            return Err("max_parallel_work must be greater than 0".into());
        }
        Ok(())
    }

    /// Effective concurrency limit for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Configuration`] when the configuration is invalid.
    pub fn concurrency_limit(&self) -> Result<usize, QueueError> {
        self.mode
            .resolve_limit(self.max_parallel_work, DEFAULT_MAX_PARALLEL_WORK)
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file is read first when present. Unset variables fall back to
    /// `auto` mode with the default limit.
    ///
    /// # Errors
    ///
    /// Returns a message when `.env` exists but cannot be read or parsed, or
    /// when a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, String> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a message when a variable is set to an unparsable value.
    pub fn from_vars<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(MODE_ENV) {
            Some(raw) => raw.parse::<ExecutionMode>().map_err(|e| format!("{MODE_ENV}: {e}"))?,
            None => ExecutionMode::default(),
        };
        let max_parallel_work = lookup(PARALLEL_ENV)
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("{PARALLEL_ENV}: invalid value `{raw}`: {e}"))
            })
            .transpose()?;

        let cfg = Self {
            mode,
            max_parallel_work,
        };
        cfg.validate().map_err(|e| format!("{PARALLEL_ENV}: {e}"))?;
        Ok(cfg)
    }
}

/// A missing `.env` is fine; any other load failure is reported.
fn check_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), String> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!(".env: {e}")),
    }
}

impl QueueSetConfig {
    /// Validate all queues and ensure at least one exists.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid queue.
    pub fn validate(&self) -> Result<(), String> {
        if self.queues.is_empty() {
            return Err("at least one queue must be defined".into());
        }
        for (name, queue) in &self.queues {
            queue
                .validate()
                .map_err(|e| format!("queue `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse queue set configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
