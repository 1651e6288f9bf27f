//! Summary statistics over per-iteration timings

use std::fmt;

/// Reduced timing samples, all in nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub min_ns: f64,
    pub max_ns: f64,
    pub mean_ns: f64,
    pub median_ns: f64,
    /// Population standard deviation
    pub stddev_ns: f64,
}

impl Statistics {
    /// Reduce `samples`; an empty slice yields all zeros
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &s in samples {
            min = min.min(s);
            max = max.max(s);
            sum += s;
        }
        let mean = sum / n;

        let variance = samples
            .iter()
            .map(|&s| {
                let d = s - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            count: samples.len(),
            min_ns: min,
            max_ns: max,
            mean_ns: mean,
            median_ns: median,
            stddev_ns: variance.sqrt(),
        }
    }

    #[inline]
    pub fn mean_us(&self) -> f64 {
        self.mean_ns / 1e3
    }

    #[inline]
    pub fn mean_ms(&self) -> f64 {
        self.mean_ns / 1e6
    }

    /// Standard deviation relative to the mean (0 when the mean is 0)
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean_ns == 0.0 {
            0.0
        } else {
            self.stddev_ns / self.mean_ns
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Iterations: {}", self.count)?;
        writeln!(f, "  Min:        {:.2} ns", self.min_ns)?;
        writeln!(f, "  Max:        {:.2} ns", self.max_ns)?;
        writeln!(f, "  Mean:       {:.2} ns", self.mean_ns)?;
        writeln!(f, "  Median:     {:.2} ns", self.median_ns)?;
        writeln!(f, "  Std Dev:    {:.2} ns", self.stddev_ns)?;
        write!(f, "  Mean (ms):  {:.2} ms", self.mean_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(Statistics::from_samples(&[]), Statistics::default());
    }

    #[test]
    fn test_known_values() {
        let s = Statistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert_eq!(s.min_ns, 2.0);
        assert_eq!(s.max_ns, 9.0);
        assert_eq!(s.mean_ns, 5.0);
        assert_eq!(s.median_ns, 4.5);
        assert_eq!(s.stddev_ns, 2.0);
    }

    #[test]
    fn test_odd_median_unsorted_input() {
        let s = Statistics::from_samples(&[30.0, 10.0, 20.0]);
        assert_eq!(s.median_ns, 20.0);
        assert_eq!(s.mean_ns, 20.0);
    }

    #[test]
    fn test_constant_samples() {
        let s = Statistics::from_samples(&[100.0; 16]);
        assert_eq!(s.stddev_ns, 0.0);
        assert_eq!(s.coefficient_of_variation(), 0.0);
        assert_eq!(s.min_ns, s.max_ns);
    }

    #[test]
    fn test_unit_conversions() {
        let s = Statistics::from_samples(&[2_500_000.0]);
        assert_eq!(s.mean_ms(), 2.5);
        assert_eq!(s.mean_us(), 2500.0);
    }

    #[test]
    fn test_display_report() {
        let s = Statistics::from_samples(&[1_000_000.0, 3_000_000.0]);
        let text = s.to_string();
        assert!(text.starts_with("  Iterations: 2\n"));
        assert!(text.contains("  Median:     2000000.00 ns\n"));
        assert!(text.ends_with("  Mean (ms):  2.00 ms"));
    }
}
