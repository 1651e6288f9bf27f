//! Shared pool machinery
//!
//! `ThreadPool` and `PriorityThreadPool` are thin typed fronts over
//! [`PoolCore`], which is generic over the queue discipline.
//!
//! # Locking
//!
//! One mutex guards the queue. Two condition variables hang off it:
//! `work_available` (queue became non-empty, or stop was requested) and
//! `quiesced` (queue empty and nothing in flight). The stop flag is only
//! written with the queue lock held, so a submitter that observes
//! "running" under the lock is guaranteed its task reaches a worker or
//! the shutdown drain.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use taskrt_core::{LogLevel, LogSink, Priority, RuntimeError, SubmitError, TaskPanic};

use crate::config::PoolConfig;
use crate::queue::TaskQueue;
use crate::stats::{Counters, PoolStats};
use crate::task::{Outcome, Task, TaskKind};
use crate::worker::WorkerSet;

struct Shared<Q> {
    queue: Mutex<Q>,
    work_available: Condvar,
    quiesced: Condvar,
    in_flight: AtomicUsize,
    stop: AtomicBool,
    counters: Counters,
    sink: Arc<dyn LogSink>,
}

impl<Q: TaskQueue> Shared<Q> {
    /// Stop accepting work and discard the queue
    ///
    /// Returns `false` if the pool was already stopped.
    fn stop(&self) -> bool {
        let discarded = {
            let mut queue = self.queue.lock();
            if self.stop.swap(true, Ordering::AcqRel) {
                return false;
            }
            queue.drain()
        };

        let count = discarded.len();
        Counters::add(&self.counters.cancelled, count as u64);
        self.work_available.notify_all();
        self.quiesced.notify_all();

        // Outside the lock: dropping a packaged task resolves its future
        drop(discarded);

        if count > 0 {
            tracing::debug!(discarded = count, "pool stopped, pending tasks cancelled");
        } else {
            tracing::debug!("pool stopped");
        }
        true
    }
}

/// Releases one in-flight slot when dropped, unwinding or not
struct InFlight<'a, Q: TaskQueue> {
    shared: &'a Shared<Q>,
}

impl<Q: TaskQueue> Drop for InFlight<'_, Q> {
    fn drop(&mut self) {
        let queue = self.shared.queue.lock();
        let was_last = self.shared.in_flight.fetch_sub(1, Ordering::AcqRel) == 1;
        if was_last && queue.is_empty() {
            self.shared.quiesced.notify_all();
        }
    }
}

/// Worker body: run tasks until stopped and drained
fn worker_loop<Q: TaskQueue>(shared: &Shared<Q>, index: usize) {
    tracing::trace!(worker = index, "worker started");

    loop {
        let task = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(task) = queue.pop() {
                    shared.in_flight.fetch_add(1, Ordering::AcqRel);
                    break task;
                }
                if shared.stop.load(Ordering::Acquire) {
                    tracing::trace!(worker = index, "worker exiting");
                    return;
                }
                shared.work_available.wait(&mut queue);
            }
        };
        let _in_flight = InFlight { shared };

        let kind = task.kind();
        match task.run() {
            Outcome::Completed => Counters::add(&shared.counters.completed, 1),
            Outcome::Panicked(cause) => {
                Counters::add(&shared.counters.panicked, 1);
                if kind == TaskKind::Detached {
                    report_panic(shared.sink.as_ref(), index, &cause);
                }
            }
        }
    }
}

/// Hand a detached task's panic to the sink; a panicking sink is contained
fn report_panic(sink: &dyn LogSink, index: usize, cause: &TaskPanic) {
    let message = format!("worker {} caught panic: {}", index, cause);
    let logged = panic::catch_unwind(AssertUnwindSafe(|| sink.log(LogLevel::Error, &message)));
    if let Err(payload) = logged {
        let sink_panic = TaskPanic::from_payload(payload);
        tracing::error!(
            worker = index,
            task_panic = %cause,
            sink_panic = %sink_panic,
            "log sink panicked"
        );
    }
}

/// Fixed worker set draining one queue of type `Q`
pub(crate) struct PoolCore<Q: TaskQueue> {
    shared: Arc<Shared<Q>>,
    workers: WorkerSet,
    num_workers: usize,
}

impl<Q: TaskQueue> PoolCore<Q> {
    pub(crate) fn try_new(config: PoolConfig, queue: Q) -> Result<Self, RuntimeError> {
        config.validate().map_err(RuntimeError::Config)?;

        let shared = Arc::new(Shared {
            queue: Mutex::new(queue),
            work_available: Condvar::new(),
            quiesced: Condvar::new(),
            in_flight: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            counters: Counters::default(),
            sink: config.log_sink,
        });

        let worker_shared = Arc::clone(&shared);
        let spawned = WorkerSet::spawn(
            config.num_workers,
            &config.thread_name_prefix,
            config.stack_size,
            move |index| worker_loop(&worker_shared, index),
        );

        match spawned {
            Ok(workers) => {
                tracing::debug!(
                    workers = config.num_workers,
                    prefix = %config.thread_name_prefix,
                    "thread pool started"
                );
                Ok(Self {
                    shared,
                    workers,
                    num_workers: config.num_workers,
                })
            }
            Err((mut partial, e)) => {
                tracing::warn!(
                    started = partial.len(),
                    requested = config.num_workers,
                    error = %e,
                    "worker spawn failed, tearing down pool"
                );
                shared.stop();
                partial.join();
                Err(RuntimeError::Spawn(e.to_string()))
            }
        }
    }

    pub(crate) fn push(&self, task: Task, priority: Priority) -> Result<(), SubmitError> {
        {
            let mut queue = self.shared.queue.lock();
            if self.shared.stop.load(Ordering::Acquire) {
                return Err(SubmitError::PoolStopped);
            }
            queue.push(task, priority);
        }
        Counters::add(&self.shared.counters.submitted, 1);
        self.shared.work_available.notify_one();
        Ok(())
    }

    /// Block until the queue is empty and nothing is in flight
    ///
    /// Must not be called from one of this pool's own tasks: the caller's
    /// task counts as in flight.
    pub(crate) fn wait_all(&self) {
        let mut queue = self.shared.queue.lock();
        while !(queue.is_empty() && self.shared.in_flight.load(Ordering::Acquire) == 0) {
            self.shared.quiesced.wait(&mut queue);
        }
    }

    #[inline]
    pub(crate) fn thread_count(&self) -> usize {
        self.num_workers
    }

    pub(crate) fn pending_tasks(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub(crate) fn shutdown(&self) {
        self.shared.stop();
    }

    #[inline]
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    pub(crate) fn stats(&self) -> PoolStats {
        self.shared.counters.snapshot()
    }

    /// Shut down and wait for every worker to exit
    pub(crate) fn join(&mut self) {
        self.shared.stop();
        self.workers.join();
    }
}

impl<Q: TaskQueue> Drop for PoolCore<Q> {
    fn drop(&mut self) {
        self.join();
    }
}
