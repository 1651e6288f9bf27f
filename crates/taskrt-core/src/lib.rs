//! # taskrt-core
//!
//! Core types shared by the taskrt thread pool, allocator set and
//! benchmark harness.
//!
//! This crate owns no threads and no memory policy. Everything that spawns
//! or allocates lives in `taskrt-runtime`, `taskrt-alloc` and `taskrt-bench`.
//!
//! ## Modules
//!
//! - `error` - Error taxonomy (allocation, submission, task outcome)
//! - `priority` - Task priority levels
//! - `log` - Logging sink trait and the stock sinks
//! - `env` - `TASKRT_*` environment variable helpers

pub mod error;
pub mod priority;
pub mod log;
pub mod env;

// Re-exports for convenience
pub use error::{
    AllocError, AllocResult, RuntimeError, SubmitError, TaskError, TaskPanic, TaskResult,
};
pub use priority::Priority;
pub use log::{LogLevel, LogSink, NullSink, StderrSink, TracingSink};

/// Constants shared across the workspace
pub mod constants {
    /// Alignment of the platform's strictest scalar (`max_align_t`)
    pub const MAX_ALIGN: usize = 16;

    /// Default block size for fixed-slot object pools
    pub const DEFAULT_POOL_BLOCK_SIZE: usize = 4096;

    /// Prefix for every environment variable read by the runtime
    pub const ENV_PREFIX: &str = "TASKRT_";

    /// Default worker thread name prefix
    pub const DEFAULT_THREAD_NAME: &str = "taskrt-worker";
}

/// Hardware concurrency hint, never less than one
///
/// Falls back to `1` when the platform cannot report a value.
pub fn hardware_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_concurrency_at_least_one() {
        assert!(hardware_concurrency() >= 1);
    }

    #[test]
    fn test_max_align_is_power_of_two() {
        assert!(constants::MAX_ALIGN.is_power_of_two());
        assert!(constants::MAX_ALIGN >= core::mem::align_of::<u128>().min(16));
    }
}
