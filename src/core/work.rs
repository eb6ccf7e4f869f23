//! Units of work accepted by the queue and the capture of their outcome.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Identifier assigned to each submitted item, unique per queue.
pub type WorkId = u64;

/// Boxed future produced by a work item when it is dispatched.
pub type WorkFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Structured unit of work.
///
/// Implement this for jobs that carry their own state, such as one simulated
/// function invocation. Closures can be submitted directly instead.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use emulator_work_queue::core::Work;
///
/// struct Invocation {
///     trigger: String,
/// }
///
/// #[async_trait]
/// impl Work for Invocation {
///     async fn run(self: Box<Self>) -> anyhow::Result<()> {
///         tracing::info!(trigger = %self.trigger, "invoking");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + 'static {
    /// Run the job to settlement. An `Err` is logged by the queue and dropped.
    async fn run(self: Box<Self>) -> anyhow::Result<()>;
}

/// How a dispatched item settled.
#[derive(Debug)]
pub enum WorkOutcome {
    /// The job completed successfully.
    Succeeded,
    /// The job returned an error.
    Failed(anyhow::Error),
    /// The job panicked while being invoked or polled.
    Panicked(String),
}

impl WorkOutcome {
    /// Whether the job completed without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// A submitted job, owned by the queue until it settles or is discarded.
pub struct WorkItem {
    id: WorkId,
    job: Box<dyn FnOnce() -> WorkFuture + Send>,
}

impl WorkItem {
    /// Wrap a closure producing a future.
    pub(crate) fn from_fn<F, Fut>(id: WorkId, job: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            id,
            job: Box::new(move || job().boxed()),
        }
    }

    /// Wrap a structured [`Work`] implementation.
    pub(crate) fn from_work<W: Work>(id: WorkId, work: W) -> Self {
        Self {
            id,
            job: Box::new(move || Box::new(work).run()),
        }
    }

    /// Identifier assigned at submission.
    #[must_use]
    pub const fn id(&self) -> WorkId {
        self.id
    }

    /// Invoke the job and wait for it to settle.
    ///
    /// The invocation itself happens inside the returned future, so a panic in
    /// either the closure call or the job's future is reported as
    /// [`WorkOutcome::Panicked`] instead of unwinding into the caller.
    pub(crate) async fn run(self) -> WorkOutcome {
        let job = self.job;
        match AssertUnwindSafe(async move { job().await })
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => WorkOutcome::Succeeded,
            Ok(Err(err)) => WorkOutcome::Failed(err),
            Err(panic) => WorkOutcome::Panicked(panic_message(panic.as_ref())),
        }
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem").field("id", &self.id).finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
