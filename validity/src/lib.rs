//! Asynchronous per-field validation with latest-wins semantics.
//!
//! A [`ValidationSurface`] holds one validator per named field. Validating a
//! field runs its validator in the background; if the field is validated
//! again before the first run finishes, the first result is thrown away.
//! Aggregate `is_validating` / `is_valid` flags and per-field errors are
//! published to listeners through a single designated thread.

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod executor;
pub mod property;
pub mod registry;
pub mod store;
pub mod surface;
pub mod token;
pub mod tracker;
pub mod validator;

pub use config::ValidationConfig;
pub use coordinator::{ValidationCoordinator, ValidationHandle};
pub use dispatch::{ChannelDispatcher, DispatchQueue, Dispatcher, InlineDispatcher};
pub use error::{ValidationError, ValidatorError};
pub use event::{ListenerId, ValidationEvent, ValidationFlags};
pub use executor::{Executor, ExecutorExt, TaskHandle, TokioExecutor};
pub use property::Property;
pub use surface::ValidationSurface;
pub use token::ValidationToken;
pub use validator::{IntoOutcome, Validator, ValidatorOutcome};

pub mod prelude {
    pub use crate::config::ValidationConfig;
    pub use crate::coordinator::ValidationHandle;
    pub use crate::dispatch::{ChannelDispatcher, Dispatcher, InlineDispatcher};
    pub use crate::error::{ValidationError, ValidatorError};
    pub use crate::event::{ValidationEvent, ValidationFlags};
    pub use crate::executor::{Executor, TokioExecutor};
    pub use crate::property::Property;
    pub use crate::surface::ValidationSurface;
    pub use crate::validator::Validator;
}
