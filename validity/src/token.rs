//! Staleness tokens.

use uuid::Uuid;

/// Identifies one triggered validation run.
///
/// A fresh token is minted for every run; two tokens are equal only if they
/// came from the same `begin_run` call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ValidationToken(Uuid);

impl ValidationToken {
    /// Mint a new unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ValidationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ValidationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
