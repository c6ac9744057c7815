//! Fixed-template pattern matching on the four newest classes
//!
//! Templates, in priority order (r0 = newest):
//! - A-B-B-B: r0 != r1, r1 == r2 == r3 -> predict r0 (certainty 75)
//! - A-B-C-C: r0 != r1, r1 != r2, r2 == r3 -> predict r1 (certainty 70)

use rust_decimal::Decimal;

use super::{Analyzer, ModelKind, ModelVote};
use crate::history::{ClassifiedStatus, OutcomeClass};

pub const PATTERN_MIN_HISTORY: usize = 5;

/// A recognized template and its fixed vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// A-B-B-B
    BreakAfterRun,
    /// A-B-C-C
    ShortAlternation,
}

impl Template {
    pub fn certainty(&self) -> u32 {
        match self {
            Self::BreakAfterRun => 75,
            Self::ShortAlternation => 70,
        }
    }

    /// First matching template and the class it predicts
    pub fn detect(recent: [OutcomeClass; 4]) -> Option<(Self, OutcomeClass)> {
        let [r0, r1, r2, r3] = recent;
        if r0 != r1 && r1 == r2 && r2 == r3 {
            return Some((Self::BreakAfterRun, r0));
        }
        if r0 != r1 && r1 != r2 && r2 == r3 {
            return Some((Self::ShortAlternation, r1));
        }
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for PatternAnalyzer {
    fn kind(&self) -> ModelKind {
        ModelKind::Pattern
    }

    fn min_history(&self) -> usize {
        PATTERN_MIN_HISTORY
    }

    fn analyze(&self, history: &[ClassifiedStatus]) -> ModelVote {
        if history.len() < self.min_history() {
            return ModelVote::abstain(ModelKind::Pattern, "Pattern: need at least 5 rounds.");
        }

        let recent = [
            history[0].outcome_class,
            history[1].outcome_class,
            history[2].outcome_class,
            history[3].outcome_class,
        ];

        match Template::detect(recent) {
            Some((template, class)) => {
                let rationale = match template {
                    Template::BreakAfterRun => {
                        "Pattern: run broken after three rounds (A-B-B-B), following the break."
                    }
                    Template::ShortAlternation => {
                        "Pattern: short alternation after a pair (A-B-C-C), following the swing."
                    }
                };
                ModelVote::predict(
                    ModelKind::Pattern,
                    class,
                    Decimal::from(template.certainty()),
                    rationale,
                )
            }
            None => ModelVote::abstain(ModelKind::Pattern, "Pattern: no known template found."),
        }
    }
}
