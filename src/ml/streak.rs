//! Streak and 2nd-order transition analysis
//!
//! 1. Long runs (>= 7) bet on reversal, short runs (4-6) bet on continuation.
//! 2. Without a notable run, fall back to a Markov-style lookup keyed by the
//!    two most recent classes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::{round_percent, Analyzer, ModelKind, ModelVote};
use crate::history::{ClassifiedStatus, OutcomeClass};

/// Minimum rounds before the analyzer votes
pub const STREAK_MIN_HISTORY: usize = 5;
/// Only the newest entries are scanned for a run
pub const STREAK_SCAN_LIMIT: usize = 15;
/// Run length from which a reversal is predicted
pub const REVERSAL_RUN: usize = 7;
/// Run length from which a continuation is predicted
pub const CONTINUATION_RUN: usize = 4;

/// Observed next-class tallies for one transition key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionCounts {
    pub high: u32,
    pub low: u32,
}

impl TransitionCounts {
    pub fn total(&self) -> u32 {
        self.high + self.low
    }

    fn record(&mut self, class: OutcomeClass) {
        match class {
            OutcomeClass::High => self.high += 1,
            OutcomeClass::Low => self.low += 1,
        }
    }

    /// High only on a strict majority; an even split resolves to Low
    pub fn majority(&self) -> OutcomeClass {
        if self.high > self.low {
            OutcomeClass::High
        } else {
            OutcomeClass::Low
        }
    }
}

/// 2nd-order transition table over a whole history
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    counts: HashMap<(OutcomeClass, OutcomeClass), TransitionCounts>,
}

impl TransitionTable {
    /// For every index i >= 2 the key is (class[i-2], class[i-1]) and the
    /// tallied class is class[i], all in slice order.
    pub fn build(history: &[ClassifiedStatus]) -> Self {
        let mut counts: HashMap<(OutcomeClass, OutcomeClass), TransitionCounts> = HashMap::new();
        for window in history.windows(3) {
            let key = (window[0].outcome_class, window[1].outcome_class);
            counts.entry(key).or_default().record(window[2].outcome_class);
        }
        Self { counts }
    }

    pub fn get(&self, key: (OutcomeClass, OutcomeClass)) -> Option<TransitionCounts> {
        self.counts.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Streak / transition analyzer
#[derive(Debug, Clone, Default)]
pub struct StreakAnalyzer;

impl StreakAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Class at index 0 and how many leading entries share it (scan capped at 15)
    pub fn run_length(history: &[ClassifiedStatus]) -> Option<(OutcomeClass, usize)> {
        let head = history.first()?.outcome_class;
        let run = history
            .iter()
            .take(STREAK_SCAN_LIMIT)
            .take_while(|s| s.outcome_class == head)
            .count();
        Some((head, run))
    }

    fn transition_vote(&self, history: &[ClassifiedStatus]) -> ModelVote {
        // Lookup key is (older, newer) of the two latest rounds
        let key = (history[1].outcome_class, history[0].outcome_class);
        let table = TransitionTable::build(history);

        match table.get(key).filter(|c| c.total() > 0) {
            Some(counts) => {
                let predicted = counts.majority();
                let best = counts.high.max(counts.low);
                let certainty = round_percent(
                    Decimal::from(best) * dec!(100) / Decimal::from(counts.total()),
                );
                ModelVote::predict(
                    ModelKind::Streak,
                    predicted,
                    certainty,
                    format!(
                        "Markov: after \"{}{}\" the next round was {} in {} of {} cases.",
                        key.0.code(),
                        key.1.code(),
                        predicted,
                        best,
                        counts.total()
                    ),
                )
            }
            None => ModelVote::abstain(ModelKind::Streak, "Markov: no clear transition pattern."),
        }
    }
}

impl Analyzer for StreakAnalyzer {
    fn kind(&self) -> ModelKind {
        ModelKind::Streak
    }

    fn min_history(&self) -> usize {
        STREAK_MIN_HISTORY
    }

    fn analyze(&self, history: &[ClassifiedStatus]) -> ModelVote {
        if history.len() < self.min_history() {
            return ModelVote::abstain(
                ModelKind::Streak,
                "Streak: not enough history for streak or transition analysis.",
            );
        }

        let Some((class, run)) = Self::run_length(history) else {
            return ModelVote::abstain(ModelKind::Streak, "Streak: empty history.");
        };

        if run >= REVERSAL_RUN {
            let certainty = Decimal::from(50 + 2 * (run - REVERSAL_RUN));
            return ModelVote::predict(
                ModelKind::Streak,
                class.opposite(),
                certainty,
                format!(
                    "Streak: {} consecutive {} rounds, streak exhaustion, expect reversal.",
                    run, class
                ),
            );
        }

        if run >= CONTINUATION_RUN {
            let certainty = Decimal::from(50 + 5 * run);
            return ModelVote::predict(
                ModelKind::Streak,
                class,
                certainty,
                format!("Streak: {}-round {} run, continuation of short streak.", run, class),
            );
        }

        self.transition_vote(history)
    }
}
