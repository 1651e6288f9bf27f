//! Pool counters

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a pool's lifetime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Tasks accepted by `submit`/`submit_detached`
    pub submitted: u64,
    /// Tasks whose body returned normally
    pub completed: u64,
    /// Tasks whose body panicked
    pub panicked: u64,
    /// Tasks discarded from the queue at shutdown
    pub cancelled: u64,
}

impl PoolStats {
    /// Tasks that reached a terminal state
    #[inline]
    pub fn finished(&self) -> u64 {
        self.completed + self.panicked + self.cancelled
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "submitted={} completed={} panicked={} cancelled={}",
            self.submitted, self.completed, self.panicked, self.cancelled
        )
    }
}

/// Live counters shared by the pool handle and its workers
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub panicked: AtomicU64,
    pub cancelled: AtomicU64,
}

impl Counters {
    #[inline]
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_display() {
        let c = Counters::default();
        Counters::add(&c.submitted, 5);
        Counters::add(&c.completed, 3);
        Counters::add(&c.panicked, 1);
        Counters::add(&c.cancelled, 1);

        let s = c.snapshot();
        assert_eq!(s.finished(), 5);
        assert_eq!(
            s.to_string(),
            "submitted=5 completed=3 panicked=1 cancelled=1"
        );
    }
}
