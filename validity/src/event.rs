//! Notifications delivered to surface listeners.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Something observable changed on a surface.
///
/// Events are always delivered on the dispatcher's designated thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationEvent {
    /// The "any run in flight" flag flipped.
    IsValidatingChanged(bool),
    /// The "no runs in flight and no errors" flag flipped.
    IsValidChanged(bool),
    /// A run for `field` completed (applied or discarded as stale).
    ErrorsChanged {
        /// Field whose run completed.
        field: String,
    },
    /// The embedding object reported a new value for `field`.
    FieldChanged {
        /// Field whose value changed.
        field: String,
    },
}

/// Snapshot of the aggregate flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationFlags {
    /// At least one field has a run in flight.
    pub is_validating: bool,
    /// Nothing in flight and no stored errors.
    pub is_valid: bool,
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self {
            is_validating: false,
            is_valid: true,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

/// Callback invoked for every event.
pub type Listener = Arc<dyn Fn(&ValidationEvent) + Send + Sync>;

/// Listener list plus the last flags that were announced.
///
/// Only the designated thread calls `refresh`/`emit`; the locks keep the
/// type `Sync` and guard `subscribe` from other threads.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
    published: Mutex<ValidationFlags>,
}

impl Notifier {
    pub(crate) fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Announce `flags`, emitting change events only for flags that differ
    /// from what was last announced, then `ErrorsChanged` for `completed`.
    pub(crate) fn refresh(&self, flags: ValidationFlags, completed: Option<String>) {
        let mut events = Vec::with_capacity(3);
        {
            let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
            if published.is_validating != flags.is_validating {
                events.push(ValidationEvent::IsValidatingChanged(flags.is_validating));
            }
            if published.is_valid != flags.is_valid {
                events.push(ValidationEvent::IsValidChanged(flags.is_valid));
            }
            *published = flags;
        }

        if let Some(field) = completed {
            events.push(ValidationEvent::ErrorsChanged { field });
        }

        for event in &events {
            self.emit(event);
        }
    }

    pub(crate) fn emit(&self, event: &ValidationEvent) {
        // Listeners may subscribe or trigger validation from inside the
        // callback, so call them outside the lock.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    pub(crate) fn published(&self) -> ValidationFlags {
        *self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
