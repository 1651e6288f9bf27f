//! Pool configuration
//!
//! Library defaults with runtime environment overrides.
//!
//! # Example
//!
//! ```rust,ignore
//! use taskrt_runtime::PoolConfig;
//!
//! // Defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or customize programmatically
//! let config = PoolConfig::from_env()
//!     .num_workers(8)
//!     .thread_name_prefix("render");
//! ```

use std::fmt;
use std::sync::Arc;

use taskrt_core::constants::DEFAULT_THREAD_NAME;
use taskrt_core::{env, hardware_concurrency, LogSink, StderrSink};

/// Thread pool configuration with builder pattern.
#[derive(Clone)]
pub struct PoolConfig {
    /// Number of worker threads (never zero)
    pub num_workers: usize,
    /// Worker threads are named `{prefix}-{index}`
    pub thread_name_prefix: String,
    /// Stack size for worker threads; `None` uses the platform default
    pub stack_size: Option<usize>,
    /// Receives panics swallowed from detached tasks
    pub log_sink: Arc<dyn LogSink>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `TASKRT_NUM_WORKERS` - Number of worker threads (0 is treated as 1)
    /// - `TASKRT_THREAD_NAME` - Worker thread name prefix
    /// - `TASKRT_STACK_SIZE` - Worker stack size in bytes
    pub fn from_env() -> Self {
        Self {
            num_workers: env::get("NUM_WORKERS", hardware_concurrency()).max(1),
            thread_name_prefix: env::get_opt::<String>("THREAD_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string()),
            stack_size: env::get_opt("STACK_SIZE"),
            log_sink: Arc::new(StderrSink::from_env()),
        }
    }

    /// Defaults with a fixed worker count
    pub fn with_workers(n: usize) -> Self {
        Self::from_env().num_workers(n)
    }

    /// Set number of worker threads; zero is normalised to one
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n.max(1);
        self
    }

    /// Set worker thread name prefix
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set worker stack size in bytes
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Route detached-task panics to `sink`
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1");
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty");
        }
        if self.stack_size == Some(0) {
            return Err("stack_size must be non-zero");
        }
        Ok(())
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("num_workers", &self.num_workers)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("stack_size", &self.stack_size)
            .finish_non_exhaustive()
    }
}
