//! Runtime adapters that host the scheduler.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
