//! Per-field error storage backed by DashMap

use dashmap::DashMap;

/// Thread-safe mapping from field name to its current error messages.
///
/// A field without errors has no entry at all.
#[derive(Debug, Default)]
pub struct ErrorStore {
    errors: DashMap<String, Vec<String>>,
}

impl ErrorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the errors for `field`. An empty list removes the entry.
    pub(crate) fn apply(&self, field: &str, errors: Vec<String>) {
        if errors.is_empty() {
            self.errors.remove(field);
        } else {
            self.errors.insert(field.to_string(), errors);
        }
    }

    /// Every stored error, flattened.
    ///
    /// Order across fields is unspecified; order within a field is kept.
    pub fn all(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    /// Errors for `field`. Unknown or blank names yield nothing.
    pub fn for_field(&self, field: &str) -> Vec<String> {
        if field.trim().is_empty() {
            return Vec::new();
        }
        self.errors
            .get(field)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of fields that currently have errors.
    pub fn field_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no field has errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
