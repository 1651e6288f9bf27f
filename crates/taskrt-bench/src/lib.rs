//! # taskrt-bench
//!
//! Timing harness for callables.
//!
//! - `Benchmark` - warm-up runs, then timed iterations, reduced to
//!   [`Statistics`]
//! - `Suite` - named variants under shared settings, compared against the
//!   first-registered baseline
//! - `do_not_optimize` / `clobber_memory` - compiler barriers that keep the
//!   measured work alive
//!
//! # Example
//!
//! ```rust,ignore
//! use taskrt_bench::{do_not_optimize, Suite};
//!
//! let mut suite = Suite::new("sum", 100, 10);
//! suite.add("iter", || do_not_optimize(&(0..1000u64).sum::<u64>()));
//! suite.add("loop", || {
//!     let mut s = 0u64;
//!     for i in 0..1000 { s += i; }
//!     do_not_optimize(&s);
//! });
//! suite.print_results();
//! ```

pub mod barrier;
pub mod clock;
pub mod stats;
pub mod bench;
pub mod suite;

pub use barrier::{clobber_memory, do_not_optimize};
pub use bench::Benchmark;
pub use clock::{Clock, MonotonicClock};
pub use stats::Statistics;
pub use suite::{BenchResult, Comparison, Suite};

/// Timed iterations when not specified
pub const DEFAULT_ITERATIONS: usize = 100;

/// Discarded warm-up runs when not specified
pub const DEFAULT_WARMUP: usize = 10;
