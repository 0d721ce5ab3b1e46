//! Observable field values.

use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use crate::coordinator::ValidationHandle;
use crate::surface::WeakSurface;

/// Observable field value bound to a [`ValidationSurface`].
///
/// `Property<T>` uses `Arc<RwLock<T>>` internally, making it cheap to clone
/// and safe to capture inside validators. Changing the value reports the
/// change to the surface, which re-validates the field.
///
/// A property does not keep its surface alive. Once the surface and all
/// its clones are gone, changes are still stored but nothing is validated.
///
/// # Example
///
/// ```ignore
/// let name = surface.property("Name", String::new())?;
///
/// let value = name.clone();
/// surface.register_validator("Name", Validator::blocking(move || {
///     if value.get().len() < 3 { vec!["too short"] } else { vec![] }
/// }));
///
/// if let Some(run) = name.set("Al".to_string()) {
///     run.await;
/// }
/// ```
pub struct Property<T> {
    name: Arc<str>,
    inner: Arc<RwLock<T>>,
    surface: WeakSurface,
}

impl<T> Property<T> {
    pub(crate) fn new(name: Arc<str>, inner: Arc<RwLock<T>>, surface: WeakSurface) -> Self {
        Self {
            name,
            inner,
            surface,
        }
    }

    /// Field name used for validation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Set a new value.
    ///
    /// Returns `None` when the value is unchanged; otherwise the change is
    /// reported and the handle of the triggered run is returned.
    pub fn set(&self, value: T) -> Option<ValidationHandle>
    where
        T: PartialEq,
    {
        {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if *guard == value {
                return None;
            }
            *guard = value;
        }
        Some(self.changed())
    }

    /// Update the value using a closure. Always counts as a change.
    pub fn update<F>(&self, f: F) -> ValidationHandle
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
        self.changed()
    }

    /// Current errors of this field; empty once the surface is gone.
    pub fn errors(&self) -> Vec<String> {
        self.surface
            .upgrade()
            .map(|surface| surface.errors_for(&self.name))
            .unwrap_or_default()
    }

    fn changed(&self) -> ValidationHandle {
        let Some(surface) = self.surface.upgrade() else {
            debug!("Property '{}' changed after its surface was dropped", self.name);
            return ValidationHandle::finished();
        };

        match surface.notify_field_changed(&self.name) {
            Ok(handle) => handle,
            Err(err) => {
                warn!("Property '{}' change not validated: {}", self.name, err);
                ValidationHandle::finished()
            }
        }
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            inner: Arc::clone(&self.inner),
            surface: self.surface.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &*self.inner.read().unwrap_or_else(PoisonError::into_inner))
            .finish()
    }
}
