//! Multi-timeframe balance analysis
//!
//! Compares class counts over a short (15) and long (30) window and bets on
//! mean reversion toward the under-represented class. The short window is
//! checked first.

use rust_decimal::Decimal;

use super::{Analyzer, ModelKind, ModelVote};
use crate::history::{ClassifiedStatus, OutcomeClass};

pub const SHORT_WINDOW: usize = 15;
pub const LONG_WINDOW: usize = 30;
/// Minimum |High - Low| in the short window to vote
pub const SHORT_IMBALANCE: u32 = 4;
/// Minimum |High - Low| in the long window to vote
pub const LONG_IMBALANCE: u32 = 7;

const SHORT_STEP: u32 = 10;
const SHORT_CAP: u32 = 80;
const LONG_STEP: u32 = 8;
const LONG_CAP: u32 = 75;

/// Class tallies over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub high: u32,
    pub low: u32,
}

impl ClassCounts {
    pub fn over(history: &[ClassifiedStatus], window: usize) -> Self {
        history
            .iter()
            .take(window)
            .fold(Self::default(), |mut acc, s| {
                match s.outcome_class {
                    OutcomeClass::High => acc.high += 1,
                    OutcomeClass::Low => acc.low += 1,
                }
                acc
            })
    }

    pub fn imbalance(&self) -> u32 {
        self.high.abs_diff(self.low)
    }

    pub fn under_represented(&self) -> OutcomeClass {
        if self.high > self.low {
            OutcomeClass::Low
        } else {
            OutcomeClass::High
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BalanceAnalyzer;

impl BalanceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for BalanceAnalyzer {
    fn kind(&self) -> ModelKind {
        ModelKind::Balance
    }

    fn min_history(&self) -> usize {
        LONG_WINDOW
    }

    fn analyze(&self, history: &[ClassifiedStatus]) -> ModelVote {
        if history.len() < self.min_history() {
            return ModelVote::abstain(
                ModelKind::Balance,
                "Balance: need more history for multi-timeframe analysis.",
            );
        }

        let short = ClassCounts::over(history, SHORT_WINDOW);
        let long = ClassCounts::over(history, LONG_WINDOW);

        if short.imbalance() >= SHORT_IMBALANCE {
            let certainty = (short.imbalance() * SHORT_STEP).min(SHORT_CAP);
            return ModelVote::predict(
                ModelKind::Balance,
                short.under_represented(),
                Decimal::from(certainty),
                format!(
                    "Balance: short window ({}) skewed {}H/{}L, expecting it to even out.",
                    SHORT_WINDOW, short.high, short.low
                ),
            );
        }

        if long.imbalance() >= LONG_IMBALANCE {
            let certainty = (long.imbalance() * LONG_STEP).min(LONG_CAP);
            return ModelVote::predict(
                ModelKind::Balance,
                long.under_represented(),
                Decimal::from(certainty),
                format!(
                    "Balance: long window ({}) skewed {}H/{}L, reversal likely to rebalance.",
                    LONG_WINDOW, long.high, long.low
                ),
            );
        }

        ModelVote::abstain(ModelKind::Balance, "Balance: windows are stable.")
    }
}
