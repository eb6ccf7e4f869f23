//! Tests for configuration validation

use emulator_work_queue::config::{QueueSetConfig, WorkQueueConfig};
use emulator_work_queue::core::{ExecutionMode, DEFAULT_MAX_PARALLEL_WORK};

#[test]
fn test_queue_config_validation() {
    assert!(WorkQueueConfig::auto(10).validate().is_ok());
    assert!(WorkQueueConfig::sequential().validate().is_ok());
    assert!(WorkQueueConfig::default().validate().is_ok());
}

#[test]
fn test_queue_config_invalid_max_parallel_work() {
    let invalid = WorkQueueConfig::auto(0);
    assert!(invalid.validate().is_err());
    assert!(invalid.concurrency_limit().is_err());
}

#[test]
fn test_sequential_ignores_max_parallel_work() {
    let cfg = WorkQueueConfig {
        mode: ExecutionMode::Sequential,
        max_parallel_work: Some(0),
    };
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.concurrency_limit().unwrap(), 1);
}

#[test]
fn test_queue_config_default_limit() {
    let cfg = WorkQueueConfig::default();
    assert_eq!(cfg.mode, ExecutionMode::Auto);
    assert_eq!(cfg.concurrency_limit().unwrap(), DEFAULT_MAX_PARALLEL_WORK);
}

#[test]
fn test_queue_config_from_json() {
    let cfg = WorkQueueConfig::from_json_str(r#"{ "mode": "auto", "max_parallel_work": 4 }"#)
        .unwrap();
    assert_eq!(cfg, WorkQueueConfig::auto(4));

    let cfg = WorkQueueConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, WorkQueueConfig::default());

    assert!(WorkQueueConfig::from_json_str(r#"{ "mode": "parallel" }"#).is_err());
    assert!(WorkQueueConfig::from_json_str(r#"{ "max_parallel_work": 0 }"#).is_err());
}

#[test]
fn test_queue_config_serializes_snake_case() {
    let json = serde_json::to_value(WorkQueueConfig::sequential()).unwrap();
    assert_eq!(json, serde_json::json!({ "mode": "sequential" }));
}

#[test]
fn test_queue_set_empty() {
    let config = QueueSetConfig {
        queues: std::collections::HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_queue_set_from_json() {
    let json = r#"{
        "queues": {
            "http": { "mode": "auto", "max_parallel_work": 16 },
            "pubsub": { "mode": "sequential" }
        }
    }"#;

    let config = QueueSetConfig::from_json_str(json).unwrap();
    assert_eq!(config.queues.len(), 2);
    assert_eq!(config.queues["http"], WorkQueueConfig::auto(16));
    assert_eq!(config.queues["pubsub"].mode, ExecutionMode::Sequential);
}

#[test]
fn test_queue_set_names_invalid_queue() {
    let json = r#"{ "queues": { "http": { "max_parallel_work": 0 } } }"#;
    let err = QueueSetConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("http"));
}
