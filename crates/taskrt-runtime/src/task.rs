//! Type-erased unit of work
//!
//! Every submission is packaged into a [`Task`]: a boxed, move-only closure
//! that runs the user body under `catch_unwind` and reports how it ended.
//! Result-bearing tasks own the producing half of their result channel, so
//! dropping an unrun task cancels its future.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use taskrt_core::{TaskError, TaskPanic};

use crate::future::{self, TaskFuture};

/// How a task body ended
#[derive(Debug)]
pub enum Outcome {
    Completed,
    /// Panicked. For packaged tasks the panic has already been routed to
    /// the future; for detached tasks the worker reports it.
    Panicked(TaskPanic),
}

impl Outcome {
    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self, Outcome::Panicked(_))
    }
}

/// Whether an awaiter exists for this task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Packaged,
    Detached,
}

/// A queued unit of work
pub struct Task {
    kind: TaskKind,
    job: Box<dyn FnOnce() -> Outcome + Send + 'static>,
}

impl Task {
    /// Package a result-bearing closure
    pub fn packaged<F, R>(f: F) -> (Task, TaskFuture<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (promise, future) = future::channel();
        let job = move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                promise.fulfill(Ok(value));
                Outcome::Completed
            }
            Err(payload) => {
                let cause = TaskPanic::from_payload(payload);
                promise.fulfill(Err(TaskError::Failed(cause.clone())));
                Outcome::Panicked(cause)
            }
        };
        (
            Task {
                kind: TaskKind::Packaged,
                job: Box::new(job),
            },
            future,
        )
    }

    /// Package a fire-and-forget closure
    pub fn detached<F>(f: F) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        let job = move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => Outcome::Completed,
            Err(payload) => Outcome::Panicked(TaskPanic::from_payload(payload)),
        };
        Task {
            kind: TaskKind::Detached,
            job: Box::new(job),
        }
    }

    #[inline]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Run the body. Never unwinds.
    ///
    /// A panic while handing over the result (for example from the drop of
    /// a value nobody awaits) is reported as `Panicked`.
    pub fn run(self) -> Outcome {
        panic::catch_unwind(AssertUnwindSafe(self.job))
            .unwrap_or_else(|payload| Outcome::Panicked(TaskPanic::from_payload(payload)))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("kind", &self.kind).finish_non_exhaustive()
    }
}
