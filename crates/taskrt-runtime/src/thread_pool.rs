//! FIFO thread pool
//!
//! # Example
//!
//! ```rust,ignore
//! use taskrt_runtime::ThreadPool;
//!
//! let pool = ThreadPool::new(4);
//! let answer = pool.submit(|| 6 * 7)?;
//! pool.submit_detached(|| println!("side effect"))?;
//! pool.wait_all();
//! assert_eq!(answer.get()?, 42);
//! ```

use taskrt_core::{Priority, RuntimeError, SubmitError};

use crate::config::PoolConfig;
use crate::future::TaskFuture;
use crate::pool::PoolCore;
use crate::queue::FifoQueue;
use crate::stats::PoolStats;
use crate::task::Task;

/// Fixed-size pool dispatching tasks in submission order
///
/// Dropping the pool shuts it down (pending tasks are cancelled) and joins
/// every worker.
pub struct ThreadPool {
    core: PoolCore<FifoQueue>,
}

impl ThreadPool {
    /// Pool with `num_workers` threads (zero is treated as one)
    ///
    /// # Panics
    ///
    /// If the OS refuses to spawn a worker thread, like `std::thread::spawn`.
    /// Use [`ThreadPool::try_with_config`] to handle that case.
    pub fn new(num_workers: usize) -> Self {
        Self::with_config(PoolConfig::with_workers(num_workers))
    }

    /// Pool sized to the hardware concurrency hint (or `TASKRT_NUM_WORKERS`)
    pub fn with_default_workers() -> Self {
        Self::with_config(PoolConfig::from_env())
    }

    /// # Panics
    ///
    /// On invalid configuration or worker spawn failure.
    pub fn with_config(config: PoolConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(pool) => pool,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_with_config(config: PoolConfig) -> Result<Self, RuntimeError> {
        Ok(Self {
            core: PoolCore::try_new(config, FifoQueue::new())?,
        })
    }

    /// Queue `f` and return a handle to its result
    ///
    /// A panic in `f` is delivered to the handle as `TaskError::Failed`.
    pub fn submit<F, R>(&self, f: F) -> Result<TaskFuture<R>, SubmitError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, future) = Task::packaged(f);
        self.core.push(task, Priority::Normal)?;
        Ok(future)
    }

    /// Queue `f` with no awaiter; a panic is reported to the log sink
    pub fn submit_detached<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.push(Task::detached(f), Priority::Normal)
    }

    /// Block until no task is queued or running
    pub fn wait_all(&self) {
        self.core.wait_all()
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.core.thread_count()
    }

    /// Advisory count of queued, not yet started tasks
    pub fn pending_tasks(&self) -> usize {
        self.core.pending_tasks()
    }

    /// Stop accepting work and cancel everything still queued. Idempotent.
    ///
    /// Running tasks finish; workers exit once idle. Does not block.
    pub fn shutdown(&self) {
        self.core.shutdown()
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.core.is_shutdown()
    }

    pub fn stats(&self) -> PoolStats {
        self.core.stats()
    }

    /// Shut down and block until every worker has exited
    pub fn join(mut self) {
        self.core.join();
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::with_default_workers()
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads", &self.thread_count())
            .field("pending", &self.pending_tasks())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    use taskrt_core::{LogLevel, LogSink, NullSink, TaskError};

    fn quiet(n: usize) -> ThreadPool {
        ThreadPool::with_config(PoolConfig::with_workers(n).log_sink(Arc::new(NullSink)))
    }

    /// Records every line it is given
    #[derive(Default)]
    struct CaptureSink(Mutex<Vec<(LogLevel, String)>>);

    impl LogSink for CaptureSink {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn test_zero_workers_becomes_one() {
        let pool = quiet(0);
        assert_eq!(pool.thread_count(), 1);
        assert_eq!(pool.submit(|| 5).unwrap().get(), Ok(5));
    }

    #[test]
    fn test_wait_all_runs_everything() {
        for workers in [1, 2, 4] {
            let pool = quiet(workers);
            let counter = Arc::new(AtomicUsize::new(0));
            for _ in 0..200 {
                let counter = Arc::clone(&counter);
                pool.submit_detached(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
            pool.wait_all();
            assert_eq!(counter.load(Ordering::SeqCst), 200);
            assert_eq!(pool.pending_tasks(), 0);
        }
    }

    #[test]
    fn test_wait_all_on_idle_pool_returns() {
        let pool = quiet(2);
        pool.wait_all();
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn test_single_worker_preserves_order() {
        let pool = quiet(1);
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..50 {
            let log = Arc::clone(&log);
            pool.submit_detached(move || log.lock().unwrap().push(i)).unwrap();
        }
        pool.wait_all();
        assert_eq!(*log.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_panic_isolation() {
        let pool = quiet(2);
        let bad = pool.submit(|| -> i32 { panic!("boom") }).unwrap();
        let good = pool.submit(|| 123).unwrap();

        let err = bad.get().unwrap_err();
        assert_eq!(err.panic_message(), Some("boom"));
        assert_eq!(good.get(), Ok(123));

        // Still healthy afterwards
        assert_eq!(pool.submit(|| "alive").unwrap().get(), Ok("alive"));
        pool.wait_all();
        let stats = pool.stats();
        assert_eq!(stats.panicked, 1);
        assert_eq!(stats.completed, 2);
    }

    #[test]
    fn test_detached_panic_goes_to_sink() {
        let sink = Arc::new(CaptureSink::default());
        let pool = ThreadPool::with_config(
            PoolConfig::with_workers(1).log_sink(sink.clone() as Arc<dyn LogSink>),
        );
        pool.submit_detached(|| panic!("detached boom")).unwrap();
        pool.wait_all();

        let lines = sink.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Error);
        assert_eq!(lines[0].1, "worker 0 caught panic: detached boom");
    }

    #[test]
    fn test_submit_after_shutdown() {
        let pool = quiet(2);
        pool.shutdown();
        assert!(pool.is_shutdown());
        assert_eq!(pool.submit(|| 1).unwrap_err(), SubmitError::PoolStopped);
        assert_eq!(
            pool.submit_detached(|| ()).unwrap_err(),
            SubmitError::PoolStopped
        );
        // Idempotent
        pool.shutdown();
        pool.wait_all();
    }

    #[test]
    fn test_shutdown_cancels_queued() {
        let pool = quiet(1);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let running = pool
            .submit(move || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                "finished"
            })
            .unwrap();
        started_rx.recv().unwrap();

        let queued: Vec<_> = (0..10).map(|i| pool.submit(move || i).unwrap()).collect();
        assert_eq!(pool.pending_tasks(), 10);

        pool.shutdown();
        assert_eq!(pool.pending_tasks(), 0);
        for fut in queued {
            assert_eq!(fut.get(), Err(TaskError::Cancelled));
        }

        release_tx.send(()).unwrap();
        assert_eq!(running.get(), Ok("finished"));
        pool.wait_all();
        assert_eq!(pool.stats().cancelled, 10);
    }

    #[test]
    fn test_worker_names_and_indices() {
        let pool = ThreadPool::with_config(
            PoolConfig::with_workers(3)
                .thread_name_prefix("named")
                .log_sink(Arc::new(NullSink)),
        );
        let futures: Vec<_> = (0..30)
            .map(|_| {
                pool.submit(|| {
                    let name = std::thread::current().name().map(str::to_owned);
                    (crate::current_worker(), name)
                })
                .unwrap()
            })
            .collect();

        let mut indices = HashSet::new();
        for fut in futures {
            let (index, name) = fut.get().unwrap();
            let index = index.expect("task ran off-pool");
            assert!(index < 3);
            assert_eq!(name, Some(format!("named-{}", index)));
            indices.insert(index);
        }
        assert!(!indices.is_empty());
    }

    #[test]
    fn test_drop_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = quiet(2);
            let counter = Arc::clone(&counter);
            pool.submit_detached(move || {
                std::thread::sleep(Duration::from_millis(20));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
            // Give the worker a chance to dequeue before drop discards
            while pool.pending_tasks() > 0 {
                std::thread::yield_now();
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_from_inside_task() {
        let pool = Arc::new(quiet(1));
        let inner = Arc::clone(&pool);
        let fut = pool
            .submit(move || {
                inner.shutdown();
                inner.is_shutdown()
            })
            .unwrap();
        assert_eq!(fut.get(), Ok(true));
        assert!(pool.is_shutdown());
    }

    #[test]
    fn test_try_with_config_rejects_invalid() {
        let config = PoolConfig::with_workers(1).thread_name_prefix("");
        match ThreadPool::try_with_config(config) {
            Err(RuntimeError::Config(msg)) => assert!(msg.contains("thread_name_prefix")),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    /// Panics on every line
    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn log(&self, _level: LogLevel, _message: &str) {
            panic!("sink failure");
        }
    }

    /// Panics when dropped
    struct LoudDrop;

    impl Drop for LoudDrop {
        fn drop(&mut self) {
            panic!("dropped loudly");
        }
    }

    /// `wait_all` on a side thread; true if it returned within `limit`
    fn wait_all_within(pool: &Arc<ThreadPool>, limit: Duration) -> bool {
        let (tx, rx) = mpsc::channel();
        let pool = Arc::clone(pool);
        std::thread::spawn(move || {
            pool.wait_all();
            let _ = tx.send(());
        });
        rx.recv_timeout(limit).is_ok()
    }

    #[test]
    fn test_panicking_sink_keeps_worker_alive() {
        let pool = Arc::new(ThreadPool::with_config(
            PoolConfig::with_workers(1).log_sink(Arc::new(PanickingSink)),
        ));
        pool.submit_detached(|| panic!("detached boom")).unwrap();
        assert!(wait_all_within(&pool, Duration::from_secs(5)));

        // Same worker still serves tasks
        let fut = pool.submit(|| 9).unwrap();
        assert!(fut.wait_timeout(Duration::from_secs(5)));
        assert_eq!(fut.get(), Ok(9));
        assert_eq!(pool.stats().panicked, 1);
    }

    #[test]
    fn test_unawaited_result_with_panicking_drop() {
        let pool = Arc::new(quiet(1));
        drop(
            pool.submit(|| {
                std::thread::sleep(Duration::from_millis(20));
                LoudDrop
            })
            .unwrap(),
        );
        assert!(wait_all_within(&pool, Duration::from_secs(5)));

        let fut = pool.submit(|| "alive").unwrap();
        assert!(fut.wait_timeout(Duration::from_secs(5)));
        assert_eq!(fut.get(), Ok("alive"));
        assert_eq!(pool.stats().panicked, 1);
    }
}
