//! One-shot result channel
//!
//! A [`Promise`] is the producing half, owned by the packaged task. A
//! [`TaskFuture`] is the consuming half, handed back to the submitter.
//! Exactly one value crosses the channel: the task's return value, the
//! captured panic, or `Cancelled` if the promise is dropped unsent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use taskrt_core::{TaskError, TaskResult};

enum State<T> {
    Pending,
    Ready(TaskResult<T>),
    Taken,
}

struct Slot<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn complete(&self, result: TaskResult<T>) {
        let mut state = self.state.lock();
        if matches!(*state, State::Pending) {
            *state = State::Ready(result);
            self.ready.notify_all();
        }
    }
}

/// Create a connected promise/future pair
pub(crate) fn channel<T>() -> (Promise<T>, TaskFuture<T>) {
    let slot = Arc::new(Slot {
        state: Mutex::new(State::Pending),
        ready: Condvar::new(),
    });
    (
        Promise {
            slot: Some(Arc::clone(&slot)),
        },
        TaskFuture { slot },
    )
}

/// Producing half of the channel
pub(crate) struct Promise<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> Promise<T> {
    /// Deliver the terminal result and wake every waiter
    pub(crate) fn fulfill(mut self, result: TaskResult<T>) {
        if let Some(slot) = self.slot.take() {
            slot.complete(result);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        // Discarded before running
        if let Some(slot) = self.slot.take() {
            slot.complete(Err(TaskError::Cancelled));
        }
    }
}

/// Handle to the eventual result of a submitted task
///
/// Becomes ready strictly after the task body finishes (or the task is
/// discarded at shutdown). `get` consumes the handle, so the result is
/// observed at most once.
pub struct TaskFuture<T> {
    slot: Arc<Slot<T>>,
}

impl<T> TaskFuture<T> {
    /// Block until the result is available
    pub fn wait(&self) {
        let mut state = self.slot.state.lock();
        while matches!(*state, State::Pending) {
            self.slot.ready.wait(&mut state);
        }
    }

    /// Block for at most `timeout`; returns whether the result is available
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.state.lock();
        while matches!(*state, State::Pending) {
            if self.slot.ready.wait_until(&mut state, deadline).timed_out() {
                return !matches!(*state, State::Pending);
            }
        }
        true
    }

    /// Non-blocking readiness check
    pub fn is_ready(&self) -> bool {
        !matches!(*self.slot.state.lock(), State::Pending)
    }

    /// Block until ready and take the result
    pub fn get(self) -> TaskResult<T> {
        let mut state = self.slot.state.lock();
        while matches!(*state, State::Pending) {
            self.slot.ready.wait(&mut state);
        }
        Self::take(&mut state)
    }

    /// Take the result if ready, otherwise hand the future back
    pub fn try_get(self) -> Result<TaskResult<T>, Self> {
        let mut state = self.slot.state.lock();
        if matches!(*state, State::Pending) {
            drop(state);
            return Err(self);
        }
        Ok(Self::take(&mut state))
    }

    fn take(state: &mut State<T>) -> TaskResult<T> {
        match std::mem::replace(state, State::Taken) {
            State::Ready(result) => result,
            // `get`/`try_get` consume the only consumer handle
            State::Taken | State::Pending => Err(TaskError::Cancelled),
        }
    }
}

impl<T> std::fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use taskrt_core::TaskPanic;

    #[test]
    fn test_fulfill_then_get() {
        let (promise, future) = channel::<u32>();
        assert!(!future.is_ready());
        promise.fulfill(Ok(7));
        assert!(future.is_ready());
        assert_eq!(future.get(), Ok(7));
    }

    #[test]
    fn test_dropped_promise_cancels() {
        let (promise, future) = channel::<u32>();
        drop(promise);
        assert_eq!(future.get(), Err(TaskError::Cancelled));
    }

    #[test]
    fn test_failed_result_delivered() {
        let (promise, future) = channel::<()>();
        promise.fulfill(Err(TaskError::Failed(TaskPanic::new("boom"))));
        let err = future.get().unwrap_err();
        assert_eq!(err.panic_message(), Some("boom"));
    }

    #[test]
    fn test_try_get_returns_future_when_pending() {
        let (promise, future) = channel::<&str>();
        let future = match future.try_get() {
            Err(f) => f,
            Ok(_) => panic!("should not be ready"),
        };
        promise.fulfill(Ok("done"));
        assert_eq!(future.try_get().ok(), Some(Ok("done")));
    }

    #[test]
    fn test_wait_timeout() {
        let (promise, future) = channel::<u8>();
        assert!(!future.wait_timeout(Duration::from_millis(10)));
        promise.fulfill(Ok(1));
        assert!(future.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_cross_thread_wakeup() {
        let (promise, future) = channel::<String>();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            promise.fulfill(Ok("hello".to_string()));
        });
        future.wait();
        assert!(future.is_ready());
        assert_eq!(future.get().unwrap(), "hello");
        handle.join().unwrap();
    }
}
