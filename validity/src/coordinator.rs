//! Per-field validation runs with latest-wins semantics.
//!
//! Every triggered run gets a fresh [`ValidationToken`]. When the validator
//! body finishes, its result is applied only if that token is still the
//! field's current one; otherwise a newer run has been requested in the
//! meantime and the result is dropped. Bodies are never cancelled, only
//! ignored.
//!
//! All observable consequences (flag changes, `ErrorsChanged`) are pushed
//! through the [`Dispatcher`]. A trigger always announces
//! `is_validating = true`, even if the run has already finished by the time
//! the designated thread gets to it. Completion refreshes recompute the
//! aggregate flags from the current tracker and store state at the moment
//! the dispatched refresh runs, never from the order in which completions
//! happened.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use log::{debug, trace, warn};

use crate::dispatch::Dispatcher;
use crate::error::ValidationError;
use crate::event::{Notifier, ValidationEvent, ValidationFlags};
use crate::executor::{Executor, ExecutorExt, TaskHandle};
use crate::registry::ValidatorRegistry;
use crate::store::ErrorStore;
use crate::token::ValidationToken;
use crate::tracker::StalenessTracker;
use crate::validator::ValidatorOutcome;

/// Completion of one triggered run.
///
/// Resolves once the run's result has been applied (or discarded as stale)
/// and its refresh has been handed to the dispatcher. Dropping the handle
/// does not stop the run.
#[derive(Debug)]
pub struct ValidationHandle {
    task: Option<TaskHandle<()>>,
}

impl ValidationHandle {
    pub(crate) fn finished() -> Self {
        Self { task: None }
    }

    fn pending(task: TaskHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Returns `true` if nothing was started (no validator registered).
    pub fn is_noop(&self) -> bool {
        self.task.is_none()
    }
}

impl Future for ValidationHandle {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.task.as_mut() {
            Some(task) => Pin::new(task).poll(cx).map(|_| ()),
            None => Poll::Ready(()),
        }
    }
}

struct Inner {
    registry: ValidatorRegistry,
    tracker: StalenessTracker,
    store: ErrorStore,
    notifier: Notifier,
    executor: Arc<dyn Executor>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Inner {
    fn flags(&self) -> ValidationFlags {
        let is_validating = !self.tracker.is_idle();
        ValidationFlags {
            is_validating,
            is_valid: !is_validating && self.store.is_empty(),
        }
    }

    fn complete(self: &Arc<Self>, field: &str, token: ValidationToken, outcome: ValidatorOutcome) {
        let errors = match outcome {
            Ok(errors) => errors,
            Err(err) => {
                debug!("Validator for '{}' failed: {}", field, err);
                vec![err.to_string()]
            }
        };

        if self.tracker.commit(field, token, || self.store.apply(field, errors)) {
            debug!("Validation {} applied for '{}'", token, field);
        } else {
            debug!("Validation {} for '{}' is stale, discarding result", token, field);
        }

        self.publish_completed(field.to_string());
    }

    fn publish_started(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.dispatcher.dispatch(Box::new(move || {
            trace!("Publishing run start");
            inner.notifier.refresh(
                ValidationFlags {
                    is_validating: true,
                    is_valid: false,
                },
                None,
            );
        }));
    }

    fn publish_completed(self: &Arc<Self>, field: String) {
        let inner = Arc::clone(self);
        self.dispatcher.dispatch(Box::new(move || {
            let flags = inner.flags();
            trace!(
                "Publishing is_validating={} is_valid={}",
                flags.is_validating, flags.is_valid
            );
            inner.notifier.refresh(flags, Some(field));
        }));
    }
}

/// Non-owning reference to a coordinator's shared state.
#[derive(Clone)]
pub(crate) struct WeakCoordinator {
    inner: Weak<Inner>,
}

impl WeakCoordinator {
    pub(crate) fn upgrade(&self) -> Option<ValidationCoordinator> {
        self.inner.upgrade().map(|inner| ValidationCoordinator { inner })
    }
}

/// Runs field validators and keeps the error store consistent.
///
/// Cheap to clone; clones share the same registry, tracker and store.
#[derive(Clone)]
pub struct ValidationCoordinator {
    inner: Arc<Inner>,
}

impl ValidationCoordinator {
    /// Create a coordinator running bodies on `executor` and publishing
    /// through `dispatcher`.
    pub fn new(executor: Arc<dyn Executor>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: ValidatorRegistry::new(),
                tracker: StalenessTracker::new(),
                store: ErrorStore::new(),
                notifier: Notifier::default(),
                executor,
                dispatcher,
            }),
        }
    }

    /// Trigger a run for `field`.
    ///
    /// Returns immediately. Fails only when `field` is empty or
    /// whitespace; an unregistered field yields an already-finished handle.
    pub fn run(&self, field: &str) -> Result<ValidationHandle, ValidationError> {
        if field.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }

        let Some(validator) = self.inner.registry.lookup(field) else {
            trace!("No validator registered for '{}'", field);
            return Ok(ValidationHandle::finished());
        };

        let token = self.inner.tracker.begin_run(field);
        debug!("Validation {} started for '{}'", token, field);
        self.inner.publish_started();

        let body = validator.invoke(self.inner.executor.as_ref());
        let inner = Arc::clone(&self.inner);
        let field = field.to_string();
        let task = self.inner.executor.execute(async move {
            let outcome = body.await;
            inner.complete(&field, token, outcome);
        });

        Ok(ValidationHandle::pending(task))
    }

    /// Trigger a run for every registered field, in registration order.
    ///
    /// Does not wait between triggers.
    pub fn run_all(&self) -> Vec<ValidationHandle> {
        let fields = self.inner.registry.fields();
        let mut handles = Vec::with_capacity(fields.len());

        for field in &fields {
            match self.run(field) {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!("Skipping registered field {:?}: {}", field, err),
            }
        }

        handles
    }

    /// Dispatch `event` to listeners on the designated thread.
    pub(crate) fn announce(&self, event: ValidationEvent) {
        let inner = Arc::clone(&self.inner);
        self.inner
            .dispatcher
            .dispatch(Box::new(move || inner.notifier.emit(&event)));
    }

    /// Aggregate flags derived from the current state.
    pub fn flags(&self) -> ValidationFlags {
        self.inner.flags()
    }

    /// Flags as last announced to listeners.
    pub fn published_flags(&self) -> ValidationFlags {
        self.inner.notifier.published()
    }

    /// The validator registry.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.inner.registry
    }

    /// The in-flight run tracker.
    pub fn tracker(&self) -> &StalenessTracker {
        &self.inner.tracker
    }

    /// The error store.
    pub fn store(&self) -> &ErrorStore {
        &self.inner.store
    }

    pub(crate) fn downgrade(&self) -> WeakCoordinator {
        WeakCoordinator {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}
