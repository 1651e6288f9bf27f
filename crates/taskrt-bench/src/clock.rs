//! Time sources

use std::time::Instant;

/// Monotonic nanosecond clock
pub trait Clock {
    /// Nanoseconds since an arbitrary fixed origin; never decreases
    fn now_ns(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// `Instant`-backed clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        // u64 nanoseconds cover ~584 years of uptime
        self.origin.elapsed().as_nanos() as u64
    }
}
