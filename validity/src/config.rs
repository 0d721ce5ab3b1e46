//! Surface configuration

/// Default name of the thread spawned by `ChannelDispatcher::from_config`.
pub const DEFAULT_DISPATCH_THREAD_NAME: &str = "validity-dispatch";

/// Behaviour switches for a [`ValidationSurface`](crate::ValidationSurface).
///
/// # Example
///
/// ```
/// use validity::ValidationConfig;
///
/// let config = ValidationConfig::default()
///     .with_distinct_errors(true)
///     .with_validate_on_change(false);
/// assert!(config.distinct_errors);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Re-run a field's validator whenever the field reports a change.
    ///
    /// Default: `true`
    pub validate_on_change: bool,

    /// Drop duplicate messages from the flattened error list.
    ///
    /// Default: `false`
    pub distinct_errors: bool,

    /// Name given to the dispatcher thread.
    ///
    /// Default: `"validity-dispatch"`
    pub dispatch_thread_name: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            distinct_errors: false,
            dispatch_thread_name: DEFAULT_DISPATCH_THREAD_NAME.to_string(),
        }
    }
}

impl ValidationConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether field changes trigger validation.
    pub fn with_validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    /// Sets whether the flattened error list is deduplicated.
    pub fn with_distinct_errors(mut self, enabled: bool) -> Self {
        self.distinct_errors = enabled;
        self
    }

    /// Sets the dispatcher thread name.
    pub fn with_dispatch_thread_name(mut self, name: impl Into<String>) -> Self {
        self.dispatch_thread_name = name.into();
        self
    }
}
