//! Worker thread management

use std::cell::Cell;
use std::io;
use std::thread::{self, JoinHandle, ThreadId};

/// Handles to a fixed set of worker threads
pub(crate) struct WorkerSet {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSet {
    /// Start `count` threads named `{prefix}-{index}`, each running `worker_fn(index)`
    ///
    /// On a spawn failure the already-started threads are returned alongside
    /// the error so the caller can stop and join them.
    pub(crate) fn spawn<F>(
        count: usize,
        prefix: &str,
        stack_size: Option<usize>,
        worker_fn: F,
    ) -> Result<Self, (Self, io::Error)>
    where
        F: Fn(usize) + Send + Clone + 'static,
    {
        let mut set = Self {
            handles: Vec::with_capacity(count),
        };

        for i in 0..count {
            let worker_fn = worker_fn.clone();
            let mut builder = thread::Builder::new().name(format!("{}-{}", prefix, i));
            if let Some(size) = stack_size {
                builder = builder.stack_size(size);
            }

            let spawned = builder.spawn(move || {
                set_current_worker(Some(i));
                worker_fn(i);
                set_current_worker(None);
            });

            match spawned {
                Ok(handle) => set.handles.push(handle),
                Err(e) => return Err((set, e)),
            }
        }

        Ok(set)
    }

    /// Number of started workers
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Wait for all workers to finish
    ///
    /// A worker that drops its own pool cannot join itself; its handle is
    /// detached instead.
    pub(crate) fn join(&mut self) {
        let me: ThreadId = thread::current().id();
        for handle in self.handles.drain(..) {
            if handle.thread().id() == me {
                continue;
            }
            let _ = handle.join();
        }
    }
}

thread_local! {
    static CURRENT_WORKER: Cell<Option<usize>> = const { Cell::new(None) };
}

fn set_current_worker(index: Option<usize>) {
    CURRENT_WORKER.with(|cell| cell.set(index));
}

/// Index of the pool worker running the current thread, `None` off-pool
#[inline]
pub fn current_worker() -> Option<usize> {
    CURRENT_WORKER.with(|cell| cell.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_off_pool_thread_has_no_index() {
        assert_eq!(current_worker(), None);
    }

    #[test]
    fn test_spawn_names_and_indices() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut set = WorkerSet::spawn(3, "unit", None, move |i| {
            let name = thread::current().name().map(str::to_owned);
            sink.lock().unwrap().push((i, current_worker(), name));
        })
        .map_err(|(_, e)| e)
        .unwrap();
        assert_eq!(set.len(), 3);
        set.join();
        assert_eq!(set.len(), 0);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                (0, Some(0), Some("unit-0".to_string())),
                (1, Some(1), Some("unit-1".to_string())),
                (2, Some(2), Some("unit-2".to_string())),
            ]
        );
    }

    #[test]
    fn test_custom_stack_size() {
        let mut set = WorkerSet::spawn(1, "stack", Some(128 * 1024), |_| {
            let buf = [0u8; 4096];
            std::hint::black_box(&buf);
        })
        .map_err(|(_, e)| e)
        .unwrap();
        set.join();
    }
}
