//! Background work execution.
//!
//! Validator bodies never run on the thread that triggered them. The engine
//! hands them to an [`Executor`], which decides where they run.
//! [`TokioExecutor`] is the default and runs async bodies as tokio tasks and
//! blocking bodies on tokio's blocking pool.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::ValidationError;

/// A blocking job handed to [`Executor::spawn_blocking`].
pub type BlockingJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs work off the calling thread.
///
/// Neither method may block the caller.
pub trait Executor: Send + Sync {
    /// Run a future to completion in the background.
    fn spawn(&self, task: BoxFuture<'static, ()>);

    /// Run a blocking closure somewhere it may block.
    fn spawn_blocking(&self, job: BlockingJob);
}

/// Typed helpers on top of [`Executor`].
pub trait ExecutorExt: Executor {
    /// Run `future` in the background and get a handle to its output.
    fn execute<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.spawn(Box::pin(async move {
            let _ = tx.send(future.await);
        }));
        TaskHandle { rx }
    }

    /// Run `job` on the blocking pool and get a handle to its output.
    fn execute_blocking<F, T>(&self, job: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.spawn_blocking(Box::new(move || {
            let _ = tx.send(job());
        }));
        TaskHandle { rx }
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}

/// Eventual output of a task started through [`ExecutorExt`].
///
/// Resolves to `Some(value)` when the task finished, or `None` when the task
/// was dropped before producing a value (panic, runtime shutdown).
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/// [`Executor`] backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Use the runtime the caller is currently running in.
    pub fn current() -> Result<Self, ValidationError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| ValidationError::NoRuntime(e.to_string()))
    }

    /// Use an explicit runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        // Completion is observed through TaskHandle, not the JoinHandle.
        let _ = self.handle.spawn(task);
    }

    fn spawn_blocking(&self, job: BlockingJob) {
        let _ = self.handle.spawn_blocking(job);
    }
}
