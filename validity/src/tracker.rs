//! In-flight run tracking.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::token::ValidationToken;

/// Remembers the latest run requested for each field.
///
/// A field has an entry exactly while its latest run is in flight. Older
/// runs of the same field are recognised as stale because their token no
/// longer matches.
#[derive(Debug, Default)]
pub struct StalenessTracker {
    runs: DashMap<String, ValidationToken>,
}

impl StalenessTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run for `field`, superseding any run already in flight.
    pub fn begin_run(&self, field: &str) -> ValidationToken {
        let token = ValidationToken::new();
        self.runs.insert(field.to_string(), token);
        token
    }

    /// Check whether `token` is still the latest run for `field`.
    pub fn is_current(&self, field: &str, token: ValidationToken) -> bool {
        self.runs.get(field).is_some_and(|current| *current == token)
    }

    /// End the run for `field` if `token` is still current.
    ///
    /// Returns `true` if the entry was removed.
    pub fn end_run(&self, field: &str, token: ValidationToken) -> bool {
        self.runs
            .remove_if(field, |_, current| *current == token)
            .is_some()
    }

    /// Run `apply` and end the run, but only if `token` is still current.
    ///
    /// The field's entry stays locked for the whole check-apply-end sequence,
    /// so a concurrent `begin_run` on the same field either happens before
    /// (and `apply` is skipped) or after (and sees the applied result).
    pub(crate) fn commit<F>(&self, field: &str, token: ValidationToken, apply: F) -> bool
    where
        F: FnOnce(),
    {
        match self.runs.entry(field.to_string()) {
            Entry::Occupied(entry) if *entry.get() == token => {
                apply();
                entry.remove();
                true
            }
            _ => false,
        }
    }

    /// Number of fields with a run in flight.
    pub fn in_flight(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if no field has a run in flight.
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty()
    }
}
