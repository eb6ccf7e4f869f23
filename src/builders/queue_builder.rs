//! Builders to construct named work queues from configuration.

use std::collections::HashMap;

use crate::config::QueueSetConfig;
use crate::core::{QueueError, WorkQueue};

/// Build one stopped [`WorkQueue`] per named entry in `cfg`.
///
/// The whole set is validated before any queue is created, so an invalid
/// entry yields no queues at all. Each queue gets its own clone of `spawner`.
///
/// # Errors
///
/// Returns [`QueueError::Configuration`] naming the first invalid queue.
pub fn build_queues<S>(
    cfg: &QueueSetConfig,
    spawner: &S,
) -> Result<HashMap<String, WorkQueue<S>>, QueueError>
where
    S: Clone,
{
    cfg.validate()
        .map_err(|e| QueueError::Configuration(format!("config invalid: {e}")))?;

    let mut queues = HashMap::with_capacity(cfg.queues.len());
    for (name, queue_cfg) in &cfg.queues {
        let queue = WorkQueue::from_config_with_spawner(queue_cfg, spawner.clone())?;
        tracing::debug!(
            queue = %name,
            mode = %queue.mode(),
            limit = queue.concurrency_limit(),
            "built work queue"
        );
        queues.insert(name.clone(), queue);
    }

    Ok(queues)
}
