//! Error types for the event loop

use core_types::JsError;

/// Errors that abort an event loop run.
///
/// Promise rejections are not errors at this level; they are ordinary
/// settled state. Only host-level failures end up here.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A macrotask returned an error
    #[error("task failed: {0}")]
    TaskFailed(#[from] JsError),

    /// A microtask checkpoint ran more jobs than allowed
    #[error("microtask checkpoint exceeded {limit} microtasks")]
    MicrotaskLimitExceeded {
        /// The configured limit
        limit: usize,
    },

    /// `run_until_done` processed more tasks than allowed
    #[error("event loop exceeded {limit} tasks")]
    TaskLimitExceeded {
        /// The configured limit
        limit: usize,
    },
}

/// Result type for event loop operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
