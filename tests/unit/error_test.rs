//! Tests for error types

use emulator_work_queue::core::QueueError;

#[test]
fn test_configuration_error() {
    let err = QueueError::Configuration("max_parallel_work must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: max_parallel_work must be greater than 0"
    );
}

#[test]
fn test_no_runtime_error() {
    let err = QueueError::NoRuntime;
    assert_eq!(format!("{}", err), "no tokio runtime available to run the work queue");
}

#[test]
fn test_error_converts_to_anyhow() {
    let result: emulator_work_queue::core::AppResult<()> = Err(QueueError::NoRuntime.into());
    assert!(result.unwrap_err().downcast_ref::<QueueError>().is_some());
}
