//! Error types for the validation engine.

use std::any::Any;

use thiserror::Error;

/// Errors reported by the engine itself.
///
/// Validator failures are not part of this type: they are recovered and
/// stored as field errors (see [`ValidatorError`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `validate` was called without a usable field name.
    #[error("field name must not be empty or whitespace")]
    EmptyFieldName,

    /// No tokio runtime is reachable from the calling context.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),

    /// The designated dispatch thread could not be started.
    #[error("failed to start dispatch thread: {0}")]
    DispatchThread(String),
}

/// Failure raised by a validator body.
///
/// The message becomes the single error entry for the validated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidatorError {
    /// Error message
    pub message: String,
}

impl ValidatorError {
    /// Create a new validator error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build an error from a caught panic payload.
    pub fn from_panic(panic: &Box<dyn Any + Send>) -> Self {
        Self::new(extract_panic_message(panic))
    }
}

impl From<std::io::Error> for ValidatorError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for ValidatorError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidatorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Extract a human-readable message from a panic payload.
///
/// Panics carry either `&str` or `String` payloads; anything else falls
/// back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
