//! Named benchmark variants and baseline comparisons

use std::fmt;
use std::io::{self, Write};

use crate::bench::Benchmark;
use crate::clock::{Clock, MonotonicClock};
use crate::stats::Statistics;

const RULE_WIDTH: usize = 70;

/// Statistics for one registered variant
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub name: String,
    pub stats: Statistics,
}

/// Speed of one variant relative to the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub name: String,
    pub baseline: String,
    /// `mean(baseline) / mean(variant)`; above 1.0 means faster
    pub speedup: f64,
}

impl Comparison {
    #[inline]
    pub fn is_faster(&self) -> bool {
        self.speedup > 1.0
    }

    /// `"2.00x faster"` or `"1.50x slower"`
    pub fn describe(&self) -> String {
        if self.is_faster() {
            format!("{:.2}x faster", self.speedup)
        } else {
            format!("{:.2}x slower", 1.0 / self.speedup)
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}: {}", self.name, self.baseline, self.describe())
    }
}

/// Variants measured under shared iteration/warm-up counts
///
/// The first variant added is the baseline for comparisons.
pub struct Suite<C = MonotonicClock> {
    name: String,
    iterations: usize,
    warmup: usize,
    clock: C,
    results: Vec<BenchResult>,
}

impl Suite<MonotonicClock> {
    pub fn new(name: impl Into<String>, iterations: usize, warmup: usize) -> Self {
        Self::with_clock(name, iterations, warmup, MonotonicClock::new())
    }
}

impl<C: Clock> Suite<C> {
    pub fn with_clock(name: impl Into<String>, iterations: usize, warmup: usize, clock: C) -> Self {
        Self {
            name: name.into(),
            iterations,
            warmup,
            clock,
            results: Vec::new(),
        }
    }

    fn bench(&self, name: &str) -> Benchmark<&C> {
        Benchmark::with_clock(name, &self.clock)
            .iterations(self.iterations)
            .warmup(self.warmup)
    }

    /// Measure `action` and record it under `name`
    pub fn add<F, R>(&mut self, name: impl Into<String>, action: F) -> &Statistics
    where
        F: FnMut() -> R,
    {
        let name = name.into();
        let stats = self.bench(&name).run(action);
        self.push(name, stats)
    }

    /// Measure `action` with per-iteration setup and teardown
    pub fn add_with_setup<St, F, S, T, R>(
        &mut self,
        name: impl Into<String>,
        action: F,
        setup: S,
        teardown: T,
    ) -> &Statistics
    where
        S: FnMut() -> St,
        F: FnMut(&mut St) -> R,
        T: FnMut(St),
    {
        let name = name.into();
        let stats = self.bench(&name).run_with_setup(action, setup, teardown);
        self.push(name, stats)
    }

    fn push(&mut self, name: String, stats: Statistics) -> &Statistics {
        self.results.push(BenchResult { name, stats });
        let last = self.results.len() - 1;
        &self.results[last].stats
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Results in registration order
    #[inline]
    pub fn results(&self) -> &[BenchResult] {
        &self.results
    }

    pub fn get(&self, name: &str) -> Option<&Statistics> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.stats)
    }

    /// Every variant after the first, against the first
    pub fn comparisons(&self) -> Vec<Comparison> {
        let Some((baseline, rest)) = self.results.split_first() else {
            return Vec::new();
        };
        rest.iter()
            .map(|r| Comparison {
                name: r.name.clone(),
                baseline: baseline.name.clone(),
                speedup: speedup(baseline.stats.mean_ns, r.stats.mean_ns),
            })
            .collect()
    }

    /// Write the full report
    pub fn write_results<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Benchmark Suite: {}", self.name)?;
        writeln!(out, "{}", rule)?;

        for r in &self.results {
            writeln!(out)?;
            writeln!(out, "Benchmark: {}", r.name)?;
            writeln!(out, "{}", r.stats)?;
        }

        let comparisons = self.comparisons();
        if let Some(first) = comparisons.first() {
            writeln!(out)?;
            writeln!(out, "--- Performance Comparison ---")?;
            writeln!(out, "Baseline: {}", first.baseline)?;
            writeln!(out)?;
            for c in &comparisons {
                writeln!(out, "{}", c)?;
            }
        }

        writeln!(out, "{}", rule)
    }

    /// Write the full report to stdout
    pub fn print_results(&self) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = self.write_results(&mut handle) {
            tracing::warn!(error = %e, suite = %self.name, "failed to print benchmark results");
        }
    }
}

/// Ratio of means, guarding zero-length timings
fn speedup(baseline_mean: f64, variant_mean: f64) -> f64 {
    if variant_mean > 0.0 {
        baseline_mean / variant_mean
    } else if baseline_mean > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

impl<C> fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("iterations", &self.iterations)
            .field("warmup", &self.warmup)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::tests::ScriptedClock;

    fn scripted_suite(per_variant: &[&[u64]]) -> Suite<ScriptedClock> {
        let mut all = Vec::new();
        for durations in per_variant {
            all.extend_from_slice(durations);
        }
        let iterations = per_variant.first().map_or(0, |d| d.len());
        Suite::with_clock("scripted", iterations, 0, ScriptedClock::durations(&all))
    }

    #[test]
    fn test_registration_order_and_baseline() {
        let mut suite = scripted_suite(&[&[200, 200], &[100, 100], &[400, 400]]);
        suite.add("zeta", || ());
        suite.add("alpha", || ());
        suite.add("mid", || ());

        let names: Vec<_> = suite.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);

        let cmp = suite.comparisons();
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp[0].baseline, "zeta");
        assert_eq!(cmp[0].speedup, 2.0);
        assert!(cmp[0].is_faster());
        assert_eq!(cmp[0].describe(), "2.00x faster");
        assert_eq!(cmp[1].speedup, 0.5);
        assert_eq!(cmp[1].describe(), "2.00x slower");
    }

    #[test]
    fn test_single_variant_has_no_comparison() {
        let mut suite = scripted_suite(&[&[50]]);
        let stats = *suite.add("only", || 1);
        assert_eq!(stats.mean_ns, 50.0);
        assert!(suite.comparisons().is_empty());

        let mut out = Vec::new();
        suite.write_results(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Benchmark Suite: scripted"));
        assert!(text.contains("Benchmark: only"));
        assert!(!text.contains("Performance Comparison"));
    }

    #[test]
    fn test_report_layout() {
        let mut suite = scripted_suite(&[&[300], &[200]]);
        suite.add("slow", || ());
        suite.add("fast", || ());

        let mut out = Vec::new();
        suite.write_results(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rule = "=".repeat(RULE_WIDTH);

        assert!(text.starts_with(&format!("\n{}\nBenchmark Suite: scripted\n{}\n", rule, rule)));
        assert!(text.contains("--- Performance Comparison ---\nBaseline: slow\n\n"));
        assert!(text.contains("fast vs slow: 1.50x faster\n"));
        assert!(text.ends_with(&format!("{}\n", rule)));
    }

    #[test]
    fn test_speedup_guards() {
        assert_eq!(speedup(0.0, 0.0), 1.0);
        assert!(speedup(10.0, 0.0).is_infinite());
        assert_eq!(speedup(10.0, 5.0), 2.0);
    }

    #[test]
    fn test_setup_variant_and_lookup() {
        let mut suite = scripted_suite(&[&[10, 30]]);
        suite.add_with_setup("vec", |v: &mut Vec<u8>| v.push(1), Vec::new, drop);
        assert_eq!(suite.get("vec").map(|s| s.mean_ns), Some(20.0));
        assert!(suite.get("missing").is_none());
    }
}
