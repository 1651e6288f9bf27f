//! # taskrt - Task Runtime Toolkit
//!
//! Worker pools, special-purpose allocators and a micro-benchmark harness
//! for building and measuring concurrent programs.
//!
//! ## Features
//!
//! - **Thread Pools**: Fixed worker count, FIFO or priority dispatch
//! - **Result Handles**: Every submission returns a `TaskFuture` that
//!   yields the value, the panic, or `Cancelled` on shutdown
//! - **Panic Isolation**: A panicking task never takes a worker down
//! - **Allocators**: Fixed-capacity linear arena, growable-backed monotonic
//!   arena, fixed-slot object pool, first-fit free list
//! - **Adapter**: Typed, container-style view over any allocator
//! - **Benchmarks**: Warm-up, timed iterations, statistics, suite
//!   comparisons against a baseline
//!
//! ## Quick Start
//!
//! ```ignore
//! use taskrt::{Priority, PriorityThreadPool, ThreadPool};
//!
//! fn main() {
//!     let pool = ThreadPool::new(4);
//!     let futures: Vec<_> = (0..100)
//!         .map(|i| pool.submit(move || i * i).unwrap())
//!         .collect();
//!     let total: u64 = futures.into_iter().map(|f| f.get().unwrap()).sum();
//!     println!("sum of squares: {}", total);
//!
//!     let prio = PriorityThreadPool::new(2);
//!     let urgent = prio.submit(Priority::Critical, || "now").unwrap();
//!     println!("{}", urgent.get().unwrap());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      User Code                              │
//! │        submit(), submit_detached(), wait_all(), get()       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ThreadPool / PriorityThreadPool                │
//! │     Shared queue (FIFO or heap), stop flag, in-flight count │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │  Worker   │      │  Worker   │      │  Worker   │
//!    │  Thread   │      │  Thread   │      │  Thread   │
//!    └───────────┘      └───────────┘      └───────────┘
//!          │                   │                   │
//!          └───────────────────┼───────────────────┘
//!                              ▼
//!    ┌─────────────────────────────────────────────────────────┐
//!    │                 Per-worker scratch                      │
//!    │   LinearAllocator, MonotonicAllocator, ObjectPool,      │
//!    │   FreeListAllocator (single-threaded, one per owner)    │
//!    └─────────────────────────────────────────────────────────┘
//! ```

// Re-export core types
pub use taskrt_core::{
    AllocError,
    AllocResult,
    RuntimeError,
    SubmitError,
    TaskError,
    TaskPanic,
    TaskResult,
    Priority,
    hardware_concurrency,
    constants,
};

// Re-export logging sinks
pub use taskrt_core::{LogLevel, LogSink, NullSink, StderrSink, TracingSink};

// Re-export env utilities
pub use taskrt_core::env;

// Re-export runtime types
pub use taskrt_runtime::{
    current_worker,
    FifoQueue,
    PoolConfig,
    PoolStats,
    PriorityQueue,
    PriorityThreadPool,
    TaskFuture,
    TaskQueue,
    ThreadPool,
};

// Re-export allocators
pub use taskrt_alloc::{
    align_up,
    padding_for,
    AllocVec,
    AllocatorRef,
    FreeListAllocator,
    LinearAllocator,
    MemoryUsage,
    MonotonicAllocator,
    ObjectPool,
    RawAllocator,
    Resettable,
    TypedPool,
};

// Re-export benchmark harness
pub use taskrt_bench::{
    clobber_memory,
    do_not_optimize,
    BenchResult,
    Benchmark,
    Clock,
    Comparison,
    MonotonicClock,
    Statistics,
    Suite,
    DEFAULT_ITERATIONS,
    DEFAULT_WARMUP,
};

/// Everything a typical program needs in one import
///
/// ```ignore
/// use taskrt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AllocatorRef, FreeListAllocator, LinearAllocator, MemoryUsage, MonotonicAllocator,
        ObjectPool, Priority, PriorityThreadPool, RawAllocator, Resettable, Suite, TaskError,
        TaskFuture, ThreadPool,
    };
}
