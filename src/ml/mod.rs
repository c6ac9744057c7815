//! Prediction engine
//!
//! Heuristic ensemble over a rolling outcome history:
//! - Streak / 2nd-order transition analysis
//! - Short vs long window balance (mean reversion)
//! - Fixed-template pattern matching
//! - Weighted voting aggregation with agreement dampening
//! - Candidate sum ranking for the predicted side
//!
//! Every component is a pure function of its input snapshot.

pub mod balance;
pub mod ensemble;
pub mod pattern;
pub mod predictor;
pub mod streak;
pub mod sums;

pub use balance::BalanceAnalyzer;
pub use ensemble::{AggregateResult, ModelContribution, ModelWeights, WeightedAggregator};
pub use pattern::PatternAnalyzer;
pub use predictor::{PredictionResult, Predictor, MIN_PREDICTION_HISTORY};
pub use streak::{StreakAnalyzer, TransitionCounts, TransitionTable};
pub use sums::{SumRanker, SumScore};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::history::{ClassifiedStatus, OutcomeClass};

/// Identifies one analyzer in the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Streak,
    Balance,
    Pattern,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Streak => "streak",
            Self::Balance => "balance",
            Self::Pattern => "pattern",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One analyzer's opinion for a single invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelVote {
    pub model: ModelKind,
    /// `None` = no opinion; excluded from aggregation
    pub predicted_class: Option<OutcomeClass>,
    /// 0-100
    pub certainty: Decimal,
    /// Human-readable, never parsed
    pub rationale: String,
}

impl ModelVote {
    pub fn predict(
        model: ModelKind,
        class: OutcomeClass,
        certainty: Decimal,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            model,
            predicted_class: Some(class),
            certainty,
            rationale: rationale.into(),
        }
    }

    pub fn abstain(model: ModelKind, rationale: impl Into<String>) -> Self {
        Self {
            model,
            predicted_class: None,
            certainty: Decimal::ZERO,
            rationale: rationale.into(),
        }
    }

    pub fn has_opinion(&self) -> bool {
        self.predicted_class.is_some()
    }
}

/// A read-only heuristic over classified history (newest first)
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Shortest history the analyzer will vote on
    fn min_history(&self) -> usize;

    fn analyze(&self, history: &[ClassifiedStatus]) -> ModelVote;
}

/// Round to a whole percentage, halves away from zero
pub(crate) fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
