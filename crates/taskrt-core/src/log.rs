//! Logging sinks
//!
//! The pool reports swallowed panics from detached tasks through a
//! [`LogSink`]. Internal lifecycle events go through `tracing` directly;
//! the sink exists so embedders can route task failures wherever they want
//! without installing a subscriber.
//!
//! # Environment Variables
//!
//! Read by [`StderrSink::from_env`] (and `Default`) each time a sink is built:
//!
//! - `TASKRT_LOG_LEVEL=<level>` - off, error, warn, info, debug, trace (or 0..5)
//! - `TASKRT_FLUSH_EPRINT=1` - Flush stderr after each line

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::env;

/// Log levels (matches common conventions)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "0" => Ok(LogLevel::Off),
            "error" | "1" => Ok(LogLevel::Error),
            "warn" | "2" => Ok(LogLevel::Warn),
            "info" | "3" => Ok(LogLevel::Info),
            "debug" | "4" => Ok(LogLevel::Debug),
            "trace" | "5" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

/// Destination for runtime log records
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message)
    }
}

/// Writes `[LEVEL] message` lines to stderr
///
/// Uses a lock on stderr so concurrent workers never interleave a line.
pub struct StderrSink {
    threshold: AtomicU8,
    flush: AtomicBool,
}

impl StderrSink {
    pub const fn new(threshold: LogLevel, flush: bool) -> Self {
        Self {
            threshold: AtomicU8::new(threshold as u8),
            flush: AtomicBool::new(flush),
        }
    }

    /// Threshold and flush mode from `TASKRT_LOG_LEVEL` / `TASKRT_FLUSH_EPRINT`
    pub fn from_env() -> Self {
        Self::new(
            env::get("LOG_LEVEL", LogLevel::Info),
            env::get_bool("FLUSH_EPRINT", false),
        )
    }

    #[inline]
    pub fn threshold(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    pub fn set_flush_enabled(&self, enabled: bool) {
        self.flush.store(enabled, Ordering::Relaxed);
    }

    /// Check if a record at `level` would be written
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self.threshold()
    }

    fn write_line<W: Write>(&self, out: &mut W, level: LogLevel, message: &str) {
        let _ = writeln!(out, "{} {}", level.prefix(), message);
        if self.flush.load(Ordering::Relaxed) {
            let _ = out.flush();
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::from_env()
    }
}

impl LogSink for StderrSink {
    fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        self.write_line(&mut handle, level, message);
    }
}

/// Forwards records to the `tracing` macros of the matching level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Off => {}
            LogLevel::Error => tracing::error!(target: "taskrt", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "taskrt", "{}", message),
            LogLevel::Info => tracing::info!(target: "taskrt", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "taskrt", "{}", message),
            LogLevel::Trace => tracing::trace!(target: "taskrt", "{}", message),
        }
    }
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
