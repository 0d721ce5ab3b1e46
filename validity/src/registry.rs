//! Field → validator registry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::validator::Validator;

#[derive(Default)]
struct Entries {
    validators: HashMap<String, Validator>,
    /// Registration order, used by `validate_all`.
    order: Vec<String>,
}

/// Thread-safe mapping from field name to its active validator.
///
/// Registering a field again replaces its validator in place; the field
/// keeps its original registration position.
#[derive(Default)]
pub struct ValidatorRegistry {
    entries: RwLock<Entries>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` for `field`, replacing any previous one.
    ///
    /// Runs already in flight keep executing the old validator.
    pub fn register(&self, field: impl Into<String>, validator: Validator) {
        let field = field.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.validators.insert(field.clone(), validator).is_none() {
            entries.order.push(field);
        }
    }

    /// Remove the validator for `field`.
    ///
    /// Returns `true` if one was registered.
    pub fn unregister(&self, field: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.validators.remove(field).is_some() {
            entries.order.retain(|f| f != field);
            true
        } else {
            false
        }
    }

    /// Get the current validator for `field`.
    pub fn lookup(&self, field: &str) -> Option<Validator> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .validators
            .get(field)
            .cloned()
    }

    /// Registered fields in registration order.
    pub fn fields(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Validator {
        Validator::blocking(Vec::<String>::new)
    }

    #[test]
    fn test_lookup_unknown_field_is_none() {
        let registry = ValidatorRegistry::new();
        assert!(registry.lookup("Name").is_none());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let registry = ValidatorRegistry::new();
        registry.register("A", noop());
        registry.register("B", noop());
        registry.register("A", Validator::new(|| async { Vec::<String>::new() }));

        assert_eq!(registry.fields(), vec!["A", "B"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.lookup("A").unwrap().is_blocking());
    }

    #[test]
    fn test_unregister_removes_from_order() {
        let registry = ValidatorRegistry::new();
        registry.register("A", noop());
        registry.register("B", noop());

        assert!(registry.unregister("A"));
        assert!(!registry.unregister("A"));
        assert_eq!(registry.fields(), vec!["B"]);
    }
}
