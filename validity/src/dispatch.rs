//! Designated-thread dispatch.
//!
//! Every externally observable change (flag updates, error notifications)
//! is funneled through a [`Dispatcher`] so listeners only ever run on one
//! thread and never see two completions interleave.
//!
//! Two channel-backed flavours exist:
//! - [`ChannelDispatcher::spawn`] owns a dedicated thread that drains the
//!   queue until every dispatcher handle is dropped.
//! - [`queue`] binds the calling thread and hands back a [`DispatchQueue`]
//!   the caller drives from its own loop (the way an event loop drains its
//!   wakeup channel).
//!
//! A panicking action is logged and swallowed; later actions still run.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, ThreadId};

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use crate::config::ValidationConfig;
use crate::error::{ValidationError, extract_panic_message};

/// Unit of work run on the designated thread.
pub type Action = Box<dyn FnOnce() + Send + 'static>;

fn run_action(action: Action) {
    if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(action)) {
        warn!(
            "Dispatched action panicked: {}",
            extract_panic_message(&panic)
        );
    }
}

/// Marshals actions onto a single designated thread.
pub trait Dispatcher: Send + Sync {
    /// Run `action` on the designated thread.
    ///
    /// Runs synchronously when already on that thread, otherwise queues it.
    fn dispatch(&self, action: Action);
}

/// Dispatcher that feeds a channel drained by one thread.
///
/// Cheap to clone; all clones target the same thread.
#[derive(Clone, Debug)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<Action>,
    thread: ThreadId,
}

impl ChannelDispatcher {
    /// Start a dedicated designated thread named `name`.
    ///
    /// The thread exits once every clone of the dispatcher is dropped and
    /// the queue is empty.
    pub fn spawn(name: impl Into<String>) -> Result<Self, ValidationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let name = name.into();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let mut queue = DispatchQueue { rx };
                while queue.blocking_run_next() {}
                debug!("Dispatch thread '{}' exiting", name);
            })
            .map_err(|e| ValidationError::DispatchThread(e.to_string()))?;

        Ok(Self {
            tx,
            thread: handle.thread().id(),
        })
    }

    /// Start a dedicated thread named after `config.dispatch_thread_name`.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ValidationError> {
        Self::spawn(config.dispatch_thread_name.clone())
    }

    /// Check whether the caller is on the designated thread.
    pub fn is_designated_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Wait until every action dispatched before this call has run.
    ///
    /// Must not be awaited on the designated thread of a [`queue`] that
    /// nobody else drains.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Box::new(move || {
            let _ = tx.send(());
        }));
        let _ = rx.await;
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, action: Action) {
        if self.is_designated_thread() {
            run_action(action);
            return;
        }

        if self.tx.send(action).is_err() {
            warn!("Designated thread is gone, dropping dispatched action");
        }
    }
}

/// Receiving half of a dispatcher bound with [`queue`].
pub struct DispatchQueue {
    rx: mpsc::UnboundedReceiver<Action>,
}

impl DispatchQueue {
    /// Wait for the next action and run it.
    ///
    /// Returns `false` once every dispatcher handle has been dropped.
    pub async fn recv(&mut self) -> bool {
        match self.rx.recv().await {
            Some(action) => {
                run_action(action);
                true
            }
            None => false,
        }
    }

    /// Run every action that is already queued without waiting.
    ///
    /// Returns how many actions ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(action) = self.rx.try_recv() {
            run_action(action);
            ran += 1;
        }
        ran
    }

    fn blocking_run_next(&mut self) -> bool {
        match self.rx.blocking_recv() {
            Some(action) => {
                run_action(action);
                true
            }
            None => false,
        }
    }
}

/// Bind the calling thread as the designated thread.
///
/// Actions dispatched from other threads wait in the returned queue until
/// the caller runs them; actions dispatched from this thread run at once.
pub fn queue() -> (ChannelDispatcher, DispatchQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ChannelDispatcher {
            tx,
            thread: thread::current().id(),
        },
        DispatchQueue { rx },
    )
}

/// Dispatcher that treats every thread as designated.
///
/// Actions run synchronously on the caller. Useful for tests and for
/// embedders that serialize access themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, action: Action) {
        run_action(action);
    }
}
