//! Error types for the taskrt runtime
//!
//! - [`AllocError`] from allocators
//! - [`SubmitError`] at the submission site
//! - [`TaskError`] as seen by a task's awaiter
//!
//! [`RuntimeError`] folds them together for callers that mix them.

use std::any::Any;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// Result type for allocator operations
pub type AllocResult<T> = Result<T, AllocError>;

/// Result type delivered to a task's awaiter
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors returned by allocators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// No region large enough to satisfy the request
    #[error("out of memory: requested {requested} bytes (align {align}), {available} available")]
    OutOfMemory {
        requested: usize,
        align: usize,
        available: usize,
    },

    /// Request or call that the allocator can detect as malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl AllocError {
    #[inline]
    pub fn out_of_memory(requested: usize, align: usize, available: usize) -> Self {
        AllocError::OutOfMemory {
            requested,
            align,
            available,
        }
    }

    /// Check if this is an exhaustion error
    #[inline]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, AllocError::OutOfMemory { .. })
    }
}

/// Errors returned at the submission site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The pool has been shut down
    #[error("cannot submit task to stopped thread pool")]
    PoolStopped,
}

/// Terminal failure states of a task, as seen by its awaiter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task was discarded before it ran (pool shutdown)
    #[error("task cancelled")]
    Cancelled,

    /// The task body panicked
    #[error("task failed: {0}")]
    Failed(TaskPanic),
}

impl TaskError {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// Panic message, if the task failed
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            TaskError::Failed(p) => Some(p.message()),
            TaskError::Cancelled => None,
        }
    }
}

/// Captured panic from a task body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanic {
    message: String,
}

impl TaskPanic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build from a `catch_unwind` payload
    ///
    /// `&str` and `String` payloads (what `panic!` produces) keep their
    /// text; anything else is reported generically.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_string(),
                Err(payload) => {
                    drop_payload(payload);
                    "unknown panic payload".to_string()
                }
            },
        };
        Self { message }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Drop an opaque panic payload whose own destructor may panic
fn drop_payload(payload: Box<dyn Any + Send>) {
    if let Err(nested) = panic::catch_unwind(AssertUnwindSafe(move || drop(payload))) {
        // A second panicking payload is leaked rather than dropped
        mem::forget(nested);
    }
}

impl fmt::Display for TaskPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Any runtime error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("allocation error: {0}")]
    Alloc(#[from] AllocError),

    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("task error: {0}")]
    Task(#[from] TaskError),

    /// Pool configuration rejected by `validate`
    #[error("invalid configuration: {0}")]
    Config(&'static str),

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}
