//! Tests for utility functions

use emulator_work_queue::util::{init_tracing, DEFAULT_LOG_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("emulator_work_queue"));
}
