//! dispatch::completion
//!
//! Completion sinks for asynchronous operations.
//!
//! A [`Completion`] is consumed by exactly one delivery. If it is dropped
//! without ever being completed (the job was discarded during shutdown, or
//! the worker never got to it) the sink still receives
//! [`Error::OperationAborted`], so no caller is left waiting forever.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, Result};

type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

enum Sink<T> {
    Callback(Callback<T>),
    Channel(oneshot::Sender<Result<T>>),
}

impl<T> Sink<T> {
    fn deliver(self, result: Result<T>) {
        match self {
            Sink::Callback(callback) => callback(result),
            Sink::Channel(tx) => {
                // A dropped receiver means the caller stopped listening.
                let _ = tx.send(result);
            }
        }
    }
}

/// Where the result of an asynchronous operation goes.
pub struct Completion<T> {
    sink: Option<Sink<T>>,
}

impl<T> Completion<T> {
    /// Deliver to a closure, invoked on a worker thread.
    ///
    /// For operations on a repository the closure runs outside the
    /// repository's lane, so it may issue and wait on further operations
    /// against the same repository. Callbacks of one lane still run in the
    /// order their operations were issued.
    pub fn callback(f: impl FnOnce(Result<T>) + Send + 'static) -> Self {
        Self {
            sink: Some(Sink::Callback(Box::new(f))),
        }
    }

    /// Deliver through a oneshot channel.
    pub fn channel(tx: oneshot::Sender<Result<T>>) -> Self {
        Self {
            sink: Some(Sink::Channel(tx)),
        }
    }

    /// Deliver the result. Consumes the sink.
    pub fn complete(mut self, result: Result<T>) {
        if let Some(sink) = self.sink.take() {
            sink.deliver(result);
        }
    }

    /// Whether delivery runs caller code.
    pub(crate) fn is_callback(&self) -> bool {
        matches!(self.sink, Some(Sink::Callback(_)))
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            tracing::warn!("operation dropped before completion");
            sink.deliver(Err(Error::OperationAborted {
                reason: "operation dropped before completion".to_string(),
            }));
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.sink {
            Some(Sink::Callback(_)) => "callback",
            Some(Sink::Channel(_)) => "channel",
            None => "delivered",
        };
        f.debug_struct("Completion").field("sink", &kind).finish()
    }
}

/// A future resolving to the result of an asynchronous operation.
///
/// Awaiting it delivers the result on the awaiting task, which is how an
/// async caller gets its completion back on its own execution context.
///
/// # Example
///
/// ```no_run
/// # async fn demo(session: gitteh::Session) -> gitteh::Result<()> {
/// let repo = session.open_async("/srv/git/project.git").await?;
/// println!("bare: {}", repo.is_bare());
/// # Ok(())
/// # }
/// ```
#[must_use = "a pending operation still runs, but its result is lost if not awaited"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Create a pending result and the completion that resolves it.
    pub fn new() -> (Self, Completion<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { rx }, Completion::channel(tx))
    }

    /// Block the current thread until the result arrives.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context; `.await`
    /// the `Pending` there instead.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(lost()))
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(lost())))
    }
}

fn lost() -> Error {
    Error::OperationAborted {
        reason: "completion channel closed".to_string(),
    }
}
