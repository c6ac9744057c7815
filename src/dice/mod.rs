//! Three-dice sum distribution
//!
//! Theoretical probability of every total of three fair six-sided dice,
//! built by enumerating all 216 outcomes.

use rust_decimal::Decimal;

/// Smallest possible three-dice total
pub const MIN_SUM: u8 = 3;
/// Largest possible three-dice total
pub const MAX_SUM: u8 = 18;
/// Number of equally likely outcomes (6^3)
pub const TOTAL_OUTCOMES: u32 = 216;

/// Static table of outcome counts per sum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumDistribution {
    /// counts[s] = number of (d1, d2, d3) with d1 + d2 + d3 == s
    counts: [u32; MAX_SUM as usize + 1],
}

impl SumDistribution {
    pub fn new() -> Self {
        let mut counts = [0u32; MAX_SUM as usize + 1];
        for d1 in 1..=6usize {
            for d2 in 1..=6usize {
                for d3 in 1..=6usize {
                    counts[d1 + d2 + d3] += 1;
                }
            }
        }
        Self { counts }
    }

    /// Number of dice combinations producing `sum` (0 outside 3..=18)
    pub fn count(&self, sum: u8) -> u32 {
        self.counts.get(sum as usize).copied().unwrap_or(0)
    }

    /// Theoretical probability of `sum`; zero for impossible totals
    pub fn probability(&self, sum: u8) -> Decimal {
        Decimal::from(self.count(sum)) / Decimal::from(TOTAL_OUTCOMES)
    }

    /// (sum, count, probability) rows for every possible total
    pub fn rows(&self) -> Vec<(u8, u32, Decimal)> {
        (MIN_SUM..=MAX_SUM)
            .map(|s| (s, self.count(s), self.probability(s)))
            .collect()
    }
}

impl Default for SumDistribution {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_counts_cover_all_outcomes() {
        let dist = SumDistribution::new();
        let total: u32 = (MIN_SUM..=MAX_SUM).map(|s| dist.count(s)).sum();
        assert_eq!(total, TOTAL_OUTCOMES);
    }

    #[test]
    fn test_known_counts() {
        let dist = SumDistribution::new();
        assert_eq!(dist.count(3), 1);
        assert_eq!(dist.count(4), 3);
        assert_eq!(dist.count(10), 27);
        assert_eq!(dist.count(11), 27);
        assert_eq!(dist.count(18), 1);
    }

    #[test]
    fn test_impossible_sums() {
        let dist = SumDistribution::new();
        assert_eq!(dist.count(0), 0);
        assert_eq!(dist.count(2), 0);
        assert_eq!(dist.count(19), 0);
        assert_eq!(dist.probability(0), Decimal::ZERO);
    }

    #[test]
    fn test_symmetry() {
        let dist = SumDistribution::new();
        for s in MIN_SUM..=MAX_SUM {
            assert_eq!(dist.count(s), dist.count(21 - s), "sum {}", s);
        }
    }

    #[test]
    fn test_probability_values() {
        let dist = SumDistribution::new();
        assert_eq!(dist.probability(10), dec!(0.125));
        assert_eq!(dist.probability(11), dec!(0.125));
        let high: u32 = (11..=MAX_SUM).map(|s| dist.count(s)).sum();
        assert_eq!(high * 2, TOTAL_OUTCOMES);
    }
}
