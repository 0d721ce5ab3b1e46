//! Public face of the engine for an embedding data object.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use log::trace;

use crate::config::ValidationConfig;
use crate::coordinator::{ValidationCoordinator, ValidationHandle, WeakCoordinator};
use crate::dispatch::Dispatcher;
use crate::error::ValidationError;
use crate::event::{ListenerId, ValidationEvent, ValidationFlags};
use crate::executor::Executor;
use crate::property::Property;
use crate::validator::Validator;

/// Validation state of one data object.
///
/// Owns its own registry, tracker and error store; nothing is shared between
/// surfaces. Cheap to clone, clones share state.
///
/// # Example
///
/// ```ignore
/// let surface = ValidationSurface::new(
///     Arc::new(TokioExecutor::current()?),
///     Arc::new(ChannelDispatcher::spawn("ui")?),
/// );
/// surface.register_validator("Name", Validator::blocking(|| vec!["too short"]));
/// surface.validate("Name")?.await;
/// assert_eq!(surface.errors(), vec!["too short"]);
/// ```
#[derive(Clone)]
pub struct ValidationSurface {
    coordinator: ValidationCoordinator,
    config: Arc<ValidationConfig>,
}

impl ValidationSurface {
    /// Create a surface with the default configuration.
    pub fn new(executor: Arc<dyn Executor>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_config(executor, dispatcher, ValidationConfig::default())
    }

    /// Create a surface with an explicit configuration.
    pub fn with_config(
        executor: Arc<dyn Executor>,
        dispatcher: Arc<dyn Dispatcher>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            coordinator: ValidationCoordinator::new(executor, dispatcher),
            config: Arc::new(config),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &ValidationCoordinator {
        &self.coordinator
    }

    /// Attach `validator` to `field`, replacing any previous one.
    ///
    /// Stored errors are left alone until the field is validated again.
    pub fn register_validator(&self, field: impl Into<String>, validator: Validator) {
        self.coordinator.registry().register(field, validator);
    }

    /// Detach the validator from `field`.
    ///
    /// The field's stored errors are kept until the next run for it.
    pub fn unregister_validator(&self, field: &str) -> bool {
        self.coordinator.registry().unregister(field)
    }

    /// Validate `field` in the background.
    pub fn validate(&self, field: &str) -> Result<ValidationHandle, ValidationError> {
        self.coordinator.run(field)
    }

    /// Validate every registered field in the background.
    pub fn validate_all(&self) -> Vec<ValidationHandle> {
        self.coordinator.run_all()
    }

    /// Every current error, flattened across fields.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = self.coordinator.store().all();
        if self.config.distinct_errors {
            let mut seen = HashSet::new();
            errors.retain(|error| seen.insert(error.clone()));
        }
        errors
    }

    /// Current errors of `field`; empty for unknown or blank names.
    pub fn errors_for(&self, field: &str) -> Vec<String> {
        self.coordinator.store().for_field(field)
    }

    /// Returns `true` if any field has errors.
    pub fn has_errors(&self) -> bool {
        !self.coordinator.store().is_empty()
    }

    /// Returns `true` if nothing is in flight and no field has errors.
    pub fn is_valid(&self) -> bool {
        self.coordinator.flags().is_valid
    }

    /// Returns `true` if at least one field has a run in flight.
    pub fn is_validating(&self) -> bool {
        self.coordinator.flags().is_validating
    }

    /// Both aggregate flags, derived from the current state.
    pub fn flags(&self) -> ValidationFlags {
        self.coordinator.flags()
    }

    /// Both aggregate flags as last announced to listeners.
    pub fn published_flags(&self) -> ValidationFlags {
        self.coordinator.published_flags()
    }

    /// Receive every [`ValidationEvent`] on the designated thread.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ValidationEvent) + Send + Sync + 'static,
    {
        self.coordinator.notifier().subscribe(Arc::new(listener))
    }

    /// Stop delivering events to `id`.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.coordinator.notifier().unsubscribe(id)
    }

    /// Report that the embedding object changed `field`.
    ///
    /// Announces [`ValidationEvent::FieldChanged`] and, when
    /// `validate_on_change` is set, validates the field.
    pub fn notify_field_changed(&self, field: &str) -> Result<ValidationHandle, ValidationError> {
        if field.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }

        self.coordinator.announce(ValidationEvent::FieldChanged {
            field: field.to_string(),
        });

        if self.config.validate_on_change {
            self.validate(field)
        } else {
            trace!("Change of '{}' not validated (validate_on_change off)", field);
            Ok(ValidationHandle::finished())
        }
    }

    /// Create an observable value named `name` bound to this surface.
    pub fn property<T>(
        &self,
        name: impl Into<String>,
        initial: T,
    ) -> Result<Property<T>, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        Ok(Property::new(
            Arc::from(name),
            Arc::new(RwLock::new(initial)),
            self.downgrade(),
        ))
    }

    pub(crate) fn downgrade(&self) -> WeakSurface {
        WeakSurface {
            coordinator: self.coordinator.downgrade(),
            config: Arc::clone(&self.config),
        }
    }
}

/// Surface reference that does not keep the surface alive.
///
/// Properties are captured by the validators the surface owns, so they
/// hold one of these instead of a [`ValidationSurface`].
#[derive(Clone)]
pub(crate) struct WeakSurface {
    coordinator: WeakCoordinator,
    config: Arc<ValidationConfig>,
}

impl WeakSurface {
    pub(crate) fn upgrade(&self) -> Option<ValidationSurface> {
        self.coordinator.upgrade().map(|coordinator| ValidationSurface {
            coordinator,
            config: Arc::clone(&self.config),
        })
    }
}
