use std::any::Any;

use thiserror::Error;

/// Failures the runners raise on an executor's behalf.
///
/// Caller-supplied error types opt in through `From<ExecutorFault>`, so a
/// panicking executor surfaces in the same channel as its ordinary `Err`s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorFault {
    #[error("executor panicked: {message}")]
    Panicked { message: String },
    #[error("executor released every settle handle without settling")]
    Unsettled,
}

impl ExecutorFault {
    /// Builds a `Panicked` fault from a `catch_unwind` payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ExecutorFault::Panicked { message }
    }
}
