//! Candidate sum ranking
//!
//! Scores the seven exact totals on the predicted side against the recent
//! window: deviation from theoretical frequency, rounds since last seen, and
//! a side bonus. 3 and 18 are never candidates.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::ops::RangeInclusive;

use crate::dice::SumDistribution;
use crate::history::{OutcomeClass, OutcomeRecord, HIGH_MIN_SUM};

/// Number of newest rounds inspected; also the frequency denominator
pub const SUM_WINDOW: usize = 70;
/// Sums returned
pub const TOP_SUMS: usize = 3;
/// Rounds unseen after which the recency term saturates
const RECENCY_HORIZON: Decimal = dec!(20);

const FREQ_FACTOR: Decimal = dec!(1.5);
const TIME_FACTOR: Decimal = dec!(2.0);
const PATTERN_FACTOR: Decimal = dec!(1.0);
const SIDE_BONUS: Decimal = dec!(1.5);
const NO_BONUS: Decimal = dec!(1.0);

/// Score breakdown for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumScore {
    pub sum: u8,
    pub freq_score: Decimal,
    pub time_score: Decimal,
    pub pattern_score: Decimal,
    pub total: Decimal,
}

/// Candidate totals for a class, in iteration order
pub fn candidates(class: OutcomeClass) -> RangeInclusive<u8> {
    match class {
        OutcomeClass::High => 11..=17,
        OutcomeClass::Low => 4..=10,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SumRanker {
    distribution: SumDistribution,
}

impl SumRanker {
    pub fn new() -> Self {
        Self {
            distribution: SumDistribution::new(),
        }
    }

    /// Score every candidate, in candidate order
    pub fn score_candidates(&self, history: &[OutcomeRecord], class: OutcomeClass) -> Vec<SumScore> {
        let recent: Vec<u8> = history
            .iter()
            .take(SUM_WINDOW)
            .map(|r| r.sum.unwrap_or(0))
            .collect();

        candidates(class)
            .map(|sum| {
                let hits = recent.iter().filter(|&&s| s == sum).count();
                let recent_freq = Decimal::from(hits) / Decimal::from(SUM_WINDOW);
                let freq_score =
                    (recent_freq - self.distribution.probability(sum)).abs() * dec!(100);

                let time_not_seen = recent
                    .iter()
                    .position(|&s| s == sum)
                    .unwrap_or(recent.len());
                let time_score = (Decimal::from(time_not_seen) / RECENCY_HORIZON).min(dec!(1));

                let on_side = match class {
                    OutcomeClass::High => sum >= HIGH_MIN_SUM,
                    OutcomeClass::Low => sum < HIGH_MIN_SUM,
                };
                let pattern_score = if on_side { SIDE_BONUS } else { NO_BONUS };

                let total = freq_score * FREQ_FACTOR
                    + time_score * TIME_FACTOR
                    + pattern_score * PATTERN_FACTOR;

                SumScore {
                    sum,
                    freq_score,
                    time_score,
                    pattern_score,
                    total,
                }
            })
            .collect()
    }

    /// Candidates by descending total; ties keep candidate order
    pub fn rank(&self, history: &[OutcomeRecord], class: OutcomeClass) -> Vec<SumScore> {
        let mut scores = self.score_candidates(history, class);
        scores.sort_by(|a, b| b.total.cmp(&a.total));
        scores
    }

    /// Up to three most likely exact totals
    pub fn top_sums(&self, history: &[OutcomeRecord], class: OutcomeClass) -> Vec<u8> {
        self.rank(history, class)
            .into_iter()
            .take(TOP_SUMS)
            .map(|s| s.sum)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::HistoryBuilder;

    #[test]
    fn test_candidates_exclude_extremes() {
        assert_eq!(candidates(OutcomeClass::High).collect::<Vec<_>>(), (11..=17).collect::<Vec<u8>>());
        assert_eq!(candidates(OutcomeClass::Low).collect::<Vec<_>>(), (4..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_empty_history_keeps_candidate_order() {
        let ranker = SumRanker::new();
        // every candidate is unseen and has zero frequency; the largest
        // theoretical probability gives the largest deviation
        let top = ranker.top_sums(&[], OutcomeClass::Low);
        assert_eq!(top, vec![10, 9, 8]);
        let top = ranker.top_sums(&[], OutcomeClass::High);
        assert_eq!(top, vec![11, 12, 13]);
    }

    #[test]
    fn test_pattern_score_constant_for_candidates() {
        let ranker = SumRanker::new();
        let history = HistoryBuilder::from_sums(&[12, 7, 9, 14, 4]).records();
        for class in [OutcomeClass::High, OutcomeClass::Low] {
            for score in ranker.score_candidates(&history, class) {
                assert_eq!(score.pattern_score, dec!(1.5));
            }
        }
    }

    #[test]
    fn test_time_score() {
        let ranker = SumRanker::new();
        let mut sums = vec![10u8; 25];
        sums[0] = 4;
        sums[3] = 5;
        let history = HistoryBuilder::from_sums(&sums).records();
        let scores = ranker.score_candidates(&history, OutcomeClass::Low);

        let by_sum = |s: u8| scores.iter().find(|x| x.sum == s).unwrap().clone();
        assert_eq!(by_sum(4).time_score, dec!(0));
        assert_eq!(by_sum(5).time_score, dec!(0.15));
        // never seen in 25 rounds -> capped
        assert_eq!(by_sum(6).time_score, dec!(1));
    }

    #[test]
    fn test_frequency_uses_fixed_window() {
        let ranker = SumRanker::new();
        // 7 occurrences of 10 among 14 rounds -> 7/70 = 0.1 observed vs 0.125
        let sums: Vec<u8> = (0..14).map(|i| if i % 2 == 0 { 10 } else { 5 }).collect();
        let history = HistoryBuilder::from_sums(&sums).records();
        let scores = ranker.score_candidates(&history, OutcomeClass::Low);
        let ten = scores.iter().find(|s| s.sum == 10).unwrap();
        assert_eq!(ten.freq_score, dec!(2.5));
    }

    #[test]
    fn test_rank_is_sorted_descending() {
        let ranker = SumRanker::new();
        let history = HistoryBuilder::from_sums(&[11, 11, 13, 15, 12, 17, 16, 11, 14, 13]).records();
        let ranked = ranker.rank(&history, OutcomeClass::High);
        assert_eq!(ranked.len(), 7);
        for pair in ranked.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
        assert_eq!(ranker.top_sums(&history, OutcomeClass::High).len(), 3);
    }

    #[test]
    fn test_degenerate_records_never_match() {
        let ranker = SumRanker::new();
        let history = vec![OutcomeRecord {
            sequence_id: "#1".to_string(),
            sum: None,
            dice: None,
            raw_score: None,
        }];
        let scores = ranker.score_candidates(&history, OutcomeClass::Low);
        assert!(scores.iter().all(|s| s.time_score == dec!(0.05)));
    }
}
