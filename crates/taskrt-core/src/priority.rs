//! Task priority levels

use core::fmt;

/// Priority level for tasks submitted to a priority pool
///
/// Higher numeric values are dequeued first. Ordering between tasks of
/// equal priority is not part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    /// Background work, cleanup
    Low = 0,

    /// Default for user tasks
    #[default]
    Normal = 1,

    /// Latency-sensitive tasks
    High = 2,

    /// Dequeued ahead of everything else
    Critical = 3,
}

impl Priority {
    /// Number of priority levels
    pub const COUNT: usize = 4;

    /// Numeric rank (0 = Low, 3 = Critical)
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }

    #[inline]
    pub const fn from_u8(v: u8) -> Option<Priority> {
        match v {
            0 => Some(Priority::Low),
            1 => Some(Priority::Normal),
            2 => Some(Priority::High),
            3 => Some(Priority::Critical),
            _ => None,
        }
    }

    /// Iterator over all priorities (highest to lowest)
    pub fn iter() -> impl Iterator<Item = Priority> {
        [
            Priority::Critical,
            Priority::High,
            Priority::Normal,
            Priority::Low,
        ]
        .into_iter()
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_priority_iter() {
        let priorities: Vec<_> = Priority::iter().collect();
        assert_eq!(
            priorities,
            vec![
                Priority::Critical,
                Priority::High,
                Priority::Normal,
                Priority::Low,
            ]
        );
    }

    #[test]
    fn test_priority_round_trip_u8() {
        for p in Priority::iter() {
            assert_eq!(Priority::from_u8(p.as_u8()), Some(p));
        }
        assert_eq!(Priority::from_u8(9), None);
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::Critical.to_string(), "CRITICAL");
        assert_eq!(Priority::Low.to_string(), "LOW");
    }
}
