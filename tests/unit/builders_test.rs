//! Tests for builder modules

use std::collections::HashMap;

use emulator_work_queue::builders::build_queues;
use emulator_work_queue::config::{QueueSetConfig, WorkQueueConfig};
use emulator_work_queue::core::{ExecutionMode, QueueError, RunState};
use emulator_work_queue::runtime::TokioSpawner;

fn queue_set(entries: &[(&str, WorkQueueConfig)]) -> QueueSetConfig {
    QueueSetConfig {
        queues: entries
            .iter()
            .map(|(name, cfg)| ((*name).to_string(), cfg.clone()))
            .collect::<HashMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_build_queues_per_trigger() {
    let cfg = queue_set(&[
        ("onRequest", WorkQueueConfig::auto(8)),
        ("onDocumentWrite", WorkQueueConfig::sequential()),
    ]);
    let spawner = TokioSpawner::current().unwrap();

    let queues = build_queues(&cfg, &spawner).unwrap();
    assert_eq!(queues.len(), 2);

    let http = &queues["onRequest"];
    assert_eq!(http.mode(), ExecutionMode::Auto);
    assert_eq!(http.concurrency_limit(), 8);
    assert_eq!(http.run_state(), RunState::Stopped);

    let firestore = &queues["onDocumentWrite"];
    assert_eq!(firestore.mode(), ExecutionMode::Sequential);
    assert_eq!(firestore.concurrency_limit(), 1);
}

#[tokio::test]
async fn test_build_queues_rejects_invalid_entry() {
    let cfg = queue_set(&[
        ("ok", WorkQueueConfig::auto(2)),
        ("broken", WorkQueueConfig::auto(0)),
    ]);
    let spawner = TokioSpawner::current().unwrap();

    let err = build_queues(&cfg, &spawner).unwrap_err();
    assert!(matches!(err, QueueError::Configuration(_)));
    assert!(err.to_string().contains("broken"));
}

#[tokio::test]
async fn test_build_queues_rejects_empty_set() {
    let cfg = queue_set(&[]);
    let spawner = TokioSpawner::current().unwrap();
    assert!(build_queues(&cfg, &spawner).is_err());
}
