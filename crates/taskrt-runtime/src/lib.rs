//! # taskrt-runtime
//!
//! Fixed-size thread pool for the taskrt runtime.
//!
//! This crate provides:
//! - `ThreadPool` - FIFO dispatch over one shared queue
//! - `PriorityThreadPool` - max-heap dispatch keyed on [`Priority`]
//! - `TaskFuture` - one-shot result channel for result-bearing tasks
//! - Pool configuration with `TASKRT_*` environment overrides
//!
//! Both pools share the same worker loop: one mutex over the queue, one
//! condition variable for "work available / stop requested" and one for
//! "all work quiesced". Task panics are caught at the task boundary and
//! never reach the worker.
//!
//! [`Priority`]: taskrt_core::Priority

pub mod config;
pub mod future;
pub mod task;
pub mod queue;
pub mod worker;
pub mod stats;
mod pool;
pub mod thread_pool;
pub mod priority_pool;

// Re-exports
pub use config::PoolConfig;
pub use future::TaskFuture;
pub use queue::{FifoQueue, PriorityQueue, TaskQueue};
pub use stats::PoolStats;
pub use thread_pool::ThreadPool;
pub use priority_pool::PriorityThreadPool;
pub use worker::current_worker;
