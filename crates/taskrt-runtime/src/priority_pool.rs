//! Priority-scheduled thread pool
//!
//! Same worker loop as [`ThreadPool`](crate::ThreadPool); the queue is a
//! max-heap on [`Priority`], so a worker always takes the highest-priority
//! pending task. Ordering among equal priorities is not guaranteed.

use taskrt_core::{Priority, RuntimeError, SubmitError};

use crate::config::PoolConfig;
use crate::future::TaskFuture;
use crate::pool::PoolCore;
use crate::queue::PriorityQueue;
use crate::stats::PoolStats;
use crate::task::Task;

/// Fixed-size pool dispatching tasks by decreasing priority
pub struct PriorityThreadPool {
    core: PoolCore<PriorityQueue>,
}

impl PriorityThreadPool {
    /// # Panics
    ///
    /// If the OS refuses to spawn a worker thread.
    pub fn new(num_workers: usize) -> Self {
        Self::with_config(PoolConfig::with_workers(num_workers))
    }

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
            core: PoolCore::try_new(config, PriorityQueue::new())?,
        })
    }

    /// Queue `f` at `priority` and return a handle to its result
    pub fn submit<F, R>(&self, priority: Priority, f: F) -> Result<TaskFuture<R>, SubmitError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, future) = Task::packaged(f);
        self.core.push(task, priority)?;
        Ok(future)
    }

    pub fn submit_detached<F>(&self, priority: Priority, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.push(Task::detached(f), priority)
    }

    pub fn wait_all(&self) {
        self.core.wait_all()
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.core.thread_count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.core.pending_tasks()
    }

    /// Stop accepting work and cancel everything still queued. Idempotent.
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

    pub fn join(mut self) {
        self.core.join();
    }
}

impl Default for PriorityThreadPool {
    fn default() -> Self {
        Self::with_default_workers()
    }
}

impl std::fmt::Debug for PriorityThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityThreadPool")
            .field("threads", &self.thread_count())
            .field("pending", &self.pending_tasks())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
