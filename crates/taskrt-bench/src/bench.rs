//! Single-variant benchmark runner

use crate::barrier::do_not_optimize;
use crate::clock::{Clock, MonotonicClock};
use crate::stats::Statistics;
use crate::{DEFAULT_ITERATIONS, DEFAULT_WARMUP};

/// Runs a callable `warmup` times untimed, then `iterations` times timed
///
/// Each sample is `now()` after the action minus `now()` before it. The
/// action's return value is passed to [`do_not_optimize`] outside the
/// timed window.
#[derive(Debug, Clone)]
pub struct Benchmark<C = MonotonicClock> {
    name: String,
    iterations: usize,
    warmup: usize,
    clock: C,
    samples: Vec<f64>,
}

impl Benchmark<MonotonicClock> {
    /// 100 iterations after 10 warm-up runs, on the monotonic clock
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, MonotonicClock::new())
    }
}

impl<C: Clock> Benchmark<C> {
    pub fn with_clock(name: impl Into<String>, clock: C) -> Self {
        Self {
            name: name.into(),
            iterations: DEFAULT_ITERATIONS,
            warmup: DEFAULT_WARMUP,
            clock,
            samples: Vec::new(),
        }
    }

    pub fn iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn warmup(mut self, n: usize) -> Self {
        self.warmup = n;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw samples from the most recent run, in nanoseconds
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Time `action` alone
    pub fn run<F, R>(&mut self, mut action: F) -> Statistics
    where
        F: FnMut() -> R,
    {
        for _ in 0..self.warmup {
            do_not_optimize(&action());
        }

        self.samples.clear();
        self.samples.reserve(self.iterations);
        for _ in 0..self.iterations {
            let start = self.clock.now_ns();
            let out = action();
            let end = self.clock.now_ns();
            do_not_optimize(&out);
            self.samples.push(end.saturating_sub(start) as f64);
        }

        self.finish()
    }

    /// Time `action` between an untimed `setup` and `teardown`
    ///
    /// `setup` builds fresh per-iteration state, `action` works on it, and
    /// `teardown` consumes it. Warm-up runs go through all three.
    pub fn run_with_setup<St, F, S, T, R>(
        &mut self,
        mut action: F,
        mut setup: S,
        mut teardown: T,
    ) -> Statistics
    where
        S: FnMut() -> St,
        F: FnMut(&mut St) -> R,
        T: FnMut(St),
    {
        for _ in 0..self.warmup {
            let mut state = setup();
            do_not_optimize(&action(&mut state));
            teardown(state);
        }

        self.samples.clear();
        self.samples.reserve(self.iterations);
        for _ in 0..self.iterations {
            let mut state = setup();
            let start = self.clock.now_ns();
            let out = action(&mut state);
            let end = self.clock.now_ns();
            do_not_optimize(&out);
            drop(out);
            teardown(state);
            self.samples.push(end.saturating_sub(start) as f64);
        }

        self.finish()
    }

    fn finish(&self) -> Statistics {
        let stats = Statistics::from_samples(&self.samples);
        tracing::debug!(
            bench = %self.name,
            iterations = stats.count,
            mean_ns = stats.mean_ns,
            stddev_ns = stats.stddev_ns,
            "benchmark finished"
        );
        stats
    }
}
