//! Environment variable utilities
//!
//! Every knob the runtime reads from the environment is named
//! `TASKRT_<SUFFIX>`. Callers pass only the suffix.
//!
//! # Usage
//!
//! ```ignore
//! use taskrt_core::env;
//!
//! let workers: usize = env::get("NUM_WORKERS", 4);      // TASKRT_NUM_WORKERS
//! let flush: bool = env::get_bool("FLUSH_EPRINT", false); // TASKRT_FLUSH_EPRINT
//! let stack: Option<usize> = env::get_opt("STACK_SIZE");
//! ```

use std::str::FromStr;

use crate::constants::ENV_PREFIX;

/// Full variable name for a suffix
#[inline]
pub fn key(suffix: &str) -> String {
    format!("{}{}", ENV_PREFIX, suffix)
}

fn raw(suffix: &str) -> Option<String> {
    std::env::var(key(suffix)).ok()
}

/// Parse `TASKRT_<suffix>` as `T`, or return `default`
///
/// Unset and unparsable values both yield the default.
#[inline]
pub fn get<T>(suffix: &str, default: T) -> T
where
    T: FromStr,
{
    get_opt(suffix).unwrap_or(default)
}

/// Parse `TASKRT_<suffix>` as `T` if set and valid
#[inline]
pub fn get_opt<T>(suffix: &str) -> Option<T>
where
    T: FromStr,
{
    raw(suffix).and_then(|v| v.trim().parse().ok())
}

/// Read `TASKRT_<suffix>` as a boolean
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true. Any other
/// set value is false; unset returns `default`.
#[inline]
pub fn get_bool(suffix: &str, default: bool) -> bool {
    match raw(suffix) {
        Some(val) => matches!(
            val.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

/// Read `TASKRT_<suffix>` verbatim, or return `default`
#[inline]
pub fn get_str(suffix: &str, default: &str) -> String {
    raw(suffix).unwrap_or_else(|| default.to_string())
}

/// Check if `TASKRT_<suffix>` is set (regardless of value)
#[inline]
pub fn is_set(suffix: &str) -> bool {
    raw(suffix).is_some()
}
