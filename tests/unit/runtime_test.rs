//! Tests for tokio spawner utilities

use emulator_work_queue::core::{ExecutionMode, Spawn, WorkQueue};
use emulator_work_queue::runtime::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_requires_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[test]
fn test_queue_on_explicit_runtime_handle() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let spawner = TokioSpawner::new(runtime.handle().clone());

    // Constructed and driven from outside the runtime.
    let queue = WorkQueue::with_spawner(ExecutionMode::Auto, Some(2), spawner).unwrap();
    queue.start();

    let (tx, rx) = std::sync::mpsc::channel();
    for i in 0..4 {
        let tx = tx.clone();
        queue.submit(move || async move {
            tx.send(i)?;
            anyhow::Ok(())
        });
    }

    let mut seen: Vec<i32> = (0..4)
        .map(|_| rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
    queue.stop();
}
