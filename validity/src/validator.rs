//! Validator routines.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::error::ValidatorError;
use crate::executor::{Executor, ExecutorExt};

/// What a validator run produced: the field's errors, or a failure.
pub type ValidatorOutcome = Result<Vec<String>, ValidatorError>;

type AsyncBody = Arc<dyn Fn() -> BoxFuture<'static, ValidatorOutcome> + Send + Sync>;
type BlockingBody = Arc<dyn Fn() -> ValidatorOutcome + Send + Sync>;

/// Conversion from whatever a validator body returns into an outcome.
///
/// "No value" (`None`) counts as an empty error list.
pub trait IntoOutcome {
    /// Convert into a [`ValidatorOutcome`].
    fn into_outcome(self) -> ValidatorOutcome;
}

impl IntoOutcome for Vec<String> {
    fn into_outcome(self) -> ValidatorOutcome {
        Ok(self)
    }
}

impl IntoOutcome for Vec<&str> {
    fn into_outcome(self) -> ValidatorOutcome {
        Ok(self.into_iter().map(str::to_string).collect())
    }
}

impl IntoOutcome for Option<Vec<String>> {
    fn into_outcome(self) -> ValidatorOutcome {
        Ok(self.unwrap_or_default())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<ValidatorError>,
{
    fn into_outcome(self) -> ValidatorOutcome {
        self.map_err(Into::into).and_then(IntoOutcome::into_outcome)
    }
}

#[derive(Clone)]
enum Body {
    Async(AsyncBody),
    Blocking(BlockingBody),
}

/// A routine that produces the current error list for one field.
///
/// Cheap to clone. The body takes no arguments; capture whatever state it
/// needs (usually clones of the field's `Property`).
///
/// # Example
///
/// ```ignore
/// let name = form.name.clone();
/// surface.register_validator("name", Validator::blocking(move || {
///     if name.get().len() < 3 { vec!["too short"] } else { vec![] }
/// }));
/// ```
#[derive(Clone)]
pub struct Validator {
    body: Body,
}

impl Validator {
    /// Create a validator from an async routine.
    ///
    /// `f` itself is called on the thread that triggers validation; only the
    /// future it returns runs on the executor. Keep the synchronous part to
    /// cheap reads (cloning the current value) and do the work in the future,
    /// or use [`Validator::blocking`].
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoOutcome,
    {
        let body: AsyncBody = Arc::new(move || {
            let fut = f();
            async move { fut.await.into_outcome() }.boxed()
        });
        Self {
            body: Body::Async(body),
        }
    }

    /// Create a validator from a blocking routine.
    ///
    /// The routine runs on the executor's blocking pool.
    pub fn blocking<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        let body: BlockingBody = Arc::new(move || f().into_outcome());
        Self {
            body: Body::Blocking(body),
        }
    }

    /// Check whether this validator runs on the blocking pool.
    pub fn is_blocking(&self) -> bool {
        matches!(self.body, Body::Blocking(_))
    }

    /// Start the body.
    ///
    /// Async bodies are called right away and their future is returned for
    /// the caller to hand to the executor; blocking bodies are queued on
    /// `executor`'s blocking pool. Panics inside the body are turned into
    /// failures carrying the panic message.
    pub(crate) fn invoke<E>(&self, executor: &E) -> BoxFuture<'static, ValidatorOutcome>
    where
        E: Executor + ?Sized,
    {
        match &self.body {
            // Calling the body only builds its future; the work happens
            // when the executor polls it.
            Body::Async(body) => match panic::catch_unwind(AssertUnwindSafe(|| body())) {
                Ok(fut) => AssertUnwindSafe(fut)
                    .catch_unwind()
                    .map(|result| {
                        result.unwrap_or_else(|panic| Err(ValidatorError::from_panic(&panic)))
                    })
                    .boxed(),
                Err(panic) => future::ready(Err(ValidatorError::from_panic(&panic))).boxed(),
            },
            Body::Blocking(body) => {
                let body = Arc::clone(body);
                let handle = executor.execute_blocking(move || {
                    panic::catch_unwind(AssertUnwindSafe(|| body()))
                        .unwrap_or_else(|panic| Err(ValidatorError::from_panic(&panic)))
                });
                async move {
                    handle.await.unwrap_or_else(|| {
                        Err(ValidatorError::new("validator task was dropped before completing"))
                    })
                }
                .boxed()
            }
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.body {
            Body::Async(_) => "async",
            Body::Blocking(_) => "blocking",
        };
        f.debug_struct("Validator").field("kind", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_empty_outcome() {
        assert_eq!(None::<Vec<String>>.into_outcome(), Ok(Vec::new()));
    }

    #[test]
    fn test_error_result_maps_to_validator_error() {
        let result: Result<Vec<String>, &str> = Err("boom");
        assert_eq!(result.into_outcome(), Err(ValidatorError::new("boom")));
    }

    #[test]
    fn test_nested_option_result() {
        let result: Result<Option<Vec<String>>, String> = Ok(Some(vec!["a".to_string()]));
        assert_eq!(result.into_outcome(), Ok(vec!["a".to_string()]));
    }
}
