//! dispatch
//!
//! Execution dispatcher: runs an operation inline or on the worker pool.
//!
//! # Architecture
//!
//! Every public operation is written once, as a closure producing a
//! [`Result`]. The dispatcher is the only place that decides how that
//! closure runs:
//!
//! - [`Dispatcher::run_sync`] runs it on the caller's thread and returns the
//!   result directly.
//! - [`Dispatcher::run_async`] hands it to the worker pool and returns
//!   immediately; the result goes to a [`Completion`] exactly once.
//! - [`Dispatcher::spawn`] is `run_async` with a channel sink, returning a
//!   [`Pending`] future for callers on an async executor.
//!
//! # Ordering
//!
//! Operations against one repository go through that repository's [`Lane`]
//! and run one at a time in issue order. Operations without a lane (open
//! and init, which have no repository yet) and operations on different
//! lanes are unordered relative to each other.
//!
//! # Failures
//!
//! Nothing is retried. A panicking operation is caught on the worker and
//! delivered as [`Error::OperationAborted`]; a job discarded by shutdown
//! reports the same through its completion's drop guard. A panicking
//! callback is logged and affects nothing else.
//!
//! # Example
//!
//! ```
//! use gitteh::dispatch::{Completion, Dispatcher};
//!
//! let dispatcher = Dispatcher::new(2).unwrap();
//!
//! assert_eq!(dispatcher.run_sync(|| Ok(1 + 1)), Ok(2));
//!
//! let pending = dispatcher.spawn(None, || Ok("from a worker"));
//! assert_eq!(pending.wait(), Ok("from a worker"));
//! ```

mod completion;
mod lane;

pub use completion::{Completion, Pending};
pub use lane::Lane;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::core::config::Config;
use crate::error::{Error, Result};

/// Runs operations inline or on a bounded worker pool.
///
/// Cloning is cheap; clones share the pool. The pool shuts down in the
/// background once the last clone is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    pool: Pool,
    workers: usize,
}

/// Owns the runtime whose blocking pool serves as the worker pool.
struct Pool(Option<Runtime>);

impl Pool {
    fn handle(&self) -> Option<&Handle> {
        self.0.as_ref().map(Runtime::handle)
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // A plain drop blocks, which panics inside async contexts.
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

impl Dispatcher {
    /// Create a dispatcher with `workers` worker threads.
    pub fn new(workers: usize) -> Result<Self> {
        Self::build(workers, crate::core::config::DEFAULT_THREAD_NAME)
    }

    /// Create a dispatcher sized and named from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(config.workers(), config.thread_name())
    }

    fn build(workers: usize, thread_name: &str) -> Result<Self> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(thread_name)
            .build()
            .map_err(|e| Error::IoFailure {
                code: e.raw_os_error().unwrap_or(-1),
                message: format!("failed to start worker pool: {}", e),
            })?;

        tracing::debug!(workers, thread_name, "worker pool started");

        Ok(Self {
            inner: Arc::new(Inner {
                pool: Pool(Some(runtime)),
                workers,
            }),
        })
    }

    /// Size of the worker pool.
    pub fn workers(&self) -> usize {
        self.inner.workers
    }

    /// Run `op` inline on the calling thread.
    ///
    /// Blocks for however long the operation takes; the error, if any, is
    /// returned as-is.
    pub fn run_sync<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        tracing::trace!("dispatch inline");
        op()
    }

    /// Run `op` on the worker pool, delivering the result to `completion`.
    ///
    /// Returns immediately. With a lane, `op` runs after every job previously
    /// submitted to that lane and never concurrently with one of them. A
    /// callback completion then runs on the lane's delivery queue, so the
    /// lane is free for the next operation while the callback runs.
    pub fn run_async<T>(
        &self,
        lane: Option<&Arc<Lane>>,
        op: impl FnOnce() -> Result<T> + Send + 'static,
        completion: Completion<T>,
    ) where
        T: Send + 'static,
    {
        let Some(pool) = self.inner.pool.handle() else {
            // Dropping the completion reports the abort.
            drop(completion);
            return;
        };

        match lane {
            Some(lane) if completion.is_callback() => {
                let deliveries = Arc::clone(lane);
                let handle = pool.clone();
                lane.submit(
                    pool,
                    Box::new(move || {
                        let result = run_caught(op);
                        deliveries.deliver(&handle, Box::new(move || deliver(completion, result)));
                    }),
                );
            }
            Some(lane) => lane.submit(pool, Box::new(move || deliver(completion, run_caught(op)))),
            None => {
                tracing::trace!("dispatch to worker");
                drop(pool.spawn_blocking(move || deliver(completion, run_caught(op))));
            }
        }
    }

    /// Run `op` on the worker pool and return a future for its result.
    pub fn spawn<T>(
        &self,
        lane: Option<&Arc<Lane>>,
        op: impl FnOnce() -> Result<T> + Send + 'static,
    ) -> Pending<T>
    where
        T: Send + 'static,
    {
        let (pending, completion) = Pending::new();
        self.run_async(lane, op, completion);
        pending
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.inner.workers)
            .finish()
    }
}

/// Run `op`, turning a panic into an aborted result.
fn run_caught<T>(op: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|payload| {
        let reason = panic_reason(payload.as_ref());
        tracing::error!(%reason, "operation panicked on worker");
        Err(Error::OperationAborted { reason })
    })
}

/// Hand `result` to `completion`. A panicking callback is logged and
/// contained so the worker and its lane carry on.
fn deliver<T>(completion: Completion<T>, result: Result<T>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| completion.complete(result))) {
        let reason = panic_reason(payload.as_ref());
        tracing::error!(%reason, "completion callback panicked");
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", message)
    } else {
        "worker panicked".to_string()
    }
}
