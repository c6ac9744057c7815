//! Top-level prediction pipeline
//!
//! raw history -> status deriver -> {streak, balance, pattern} -> aggregator
//! -> sum ranker. Never fails; short histories yield a sentinel result.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::{
    Analyzer, BalanceAnalyzer, ModelContribution, ModelVote, ModelWeights, PatternAnalyzer,
    StreakAnalyzer, SumRanker, WeightedAggregator,
};
use crate::history::{classify, OutcomeClass, OutcomeRecord};

/// Rounds required before the engine predicts at all
pub const MIN_PREDICTION_HISTORY: usize = 15;

const INSUFFICIENT_RATIONALE: &str =
    "Not enough history yet: at least 15 rounds are needed for analysis.";

/// Engine output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// `None` only for the insufficient-data sentinel
    pub final_class: Option<OutcomeClass>,
    /// 0-100
    pub confidence: Decimal,
    /// Up to three exact totals, most likely first
    pub top_sums: Vec<u8>,
    pub explanations: Vec<String>,
    pub breakdown: Vec<ModelContribution>,
}

impl PredictionResult {
    /// Sentinel for histories shorter than [`MIN_PREDICTION_HISTORY`]
    pub fn insufficient() -> Self {
        Self {
            final_class: None,
            confidence: Decimal::ZERO,
            top_sums: Vec::new(),
            explanations: vec![INSUFFICIENT_RATIONALE.to_string()],
            breakdown: Vec::new(),
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.final_class.is_some()
    }

    /// Explanations as one sentence block
    pub fn explanation(&self) -> String {
        self.explanations.join(" ")
    }
}

/// Ensemble predictor
pub struct Predictor {
    analyzers: Vec<Box<dyn Analyzer>>,
    aggregator: WeightedAggregator,
    ranker: SumRanker,
}

impl Predictor {
    pub fn new(weights: ModelWeights) -> Self {
        Self {
            analyzers: vec![
                Box::new(StreakAnalyzer::new()),
                Box::new(BalanceAnalyzer::new()),
                Box::new(PatternAnalyzer::new()),
            ],
            aggregator: WeightedAggregator::new(weights),
            ranker: SumRanker::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ModelWeights::default())
    }

    /// Run every analyzer in evaluation order
    pub fn votes(&self, history: &[OutcomeRecord]) -> Vec<ModelVote> {
        let statuses = classify(history);
        self.analyzers
            .iter()
            .map(|analyzer| {
                let vote = analyzer.analyze(&statuses);
                debug!(
                    model = %vote.model,
                    class = ?vote.predicted_class,
                    certainty = %vote.certainty,
                    "model vote"
                );
                vote
            })
            .collect()
    }

    /// Predict the next round from a newest-first history
    pub fn predict(&self, history: &[OutcomeRecord]) -> PredictionResult {
        debug!(rounds = history.len(), "starting prediction");

        if history.len() < MIN_PREDICTION_HISTORY {
            info!(
                "Not enough history for prediction ({} < {} rounds)",
                history.len(),
                MIN_PREDICTION_HISTORY
            );
            return PredictionResult::insufficient();
        }

        let votes = self.votes(history);
        let aggregate = self.aggregator.aggregate(&votes);
        let top_sums = self.ranker.top_sums(history, aggregate.final_class);

        debug!(
            class = %aggregate.final_class,
            confidence = %aggregate.confidence,
            agreement = aggregate.agreement,
            ?top_sums,
            "prediction complete"
        );

        PredictionResult {
            final_class: Some(aggregate.final_class),
            confidence: aggregate.confidence,
            top_sums,
            explanations: aggregate.explanations,
            breakdown: aggregate.contributions,
        }
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ModelKind;
    use crate::testing::HistoryBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn test_short_history_returns_sentinel() {
        let predictor = Predictor::with_defaults();
        for len in [0usize, 1, 5, 14] {
            let history = HistoryBuilder::from_pattern(&"H".repeat(len)).records();
            let result = predictor.predict(&history);
            assert_eq!(result, PredictionResult::insufficient());
            assert!(result.top_sums.is_empty());
            assert_eq!(result.confidence, Decimal::ZERO);
        }
    }

    #[test]
    fn test_long_streak_end_to_end() {
        let predictor = Predictor::with_defaults();
        // 8 High then alternating: streak says reverse (Low 52),
        // pattern abstains, balance needs 30 rounds
        let pattern = format!("{}{}", "H".repeat(8), "LH".repeat(4));
        let history = HistoryBuilder::from_pattern(&pattern).records();
        let result = predictor.predict(&history);

        assert_eq!(result.final_class, Some(OutcomeClass::Low));
        // single supporting model -> capped at 60
        assert_eq!(result.confidence, dec!(60));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].model, ModelKind::Streak);
        assert!(result.top_sums.iter().all(|s| (4..=10).contains(s)));
        assert_eq!(result.top_sums.len(), 3);
    }

    #[test]
    fn test_agreeing_models() {
        let predictor = Predictor::with_defaults();
        // newest 15: L H H H then 11 High; long window mostly High
        let pattern = format!("L{}{}", "H".repeat(14), "H".repeat(16));
        let history = HistoryBuilder::from_pattern(&pattern).records();
        let result = predictor.predict(&history);

        // pattern A-B-B-B -> Low 75, balance short 14H/1L -> Low 80,
        // transition keyed (H, L) -> no matches -> streak abstains
        assert_eq!(result.final_class, Some(OutcomeClass::Low));
        assert_eq!(result.confidence, dec!(100));
        assert_eq!(result.breakdown.len(), 2);
        assert_eq!(result.explanations.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let predictor = Predictor::with_defaults();
        let history = HistoryBuilder::from_sums(&[
            12, 7, 9, 15, 11, 4, 10, 13, 16, 8, 6, 14, 11, 10, 9, 12, 5, 17, 3, 18,
        ])
        .records();
        assert_eq!(predictor.predict(&history), predictor.predict(&history));
    }

    #[test]
    fn test_analyzers_respect_min_history() {
        let predictor = Predictor::with_defaults();
        for analyzer in &predictor.analyzers {
            let min = analyzer.min_history();
            // all High is a continuation run for streak; a Low lead gives
            // balance its skew and pattern its A-B-B-B
            let lead = match analyzer.kind() {
                ModelKind::Streak => 'H',
                _ => 'L',
            };
            let enough = HistoryBuilder::from_pattern(&format!("{}{}", lead, "H".repeat(min - 1)));
            let short = HistoryBuilder::from_pattern(&format!("{}{}", lead, "H".repeat(min - 2)));

            let vote = analyzer.analyze(&short.statuses());
            assert!(!vote.has_opinion(), "{} voted below its minimum", analyzer.kind());
            let vote = analyzer.analyze(&enough.statuses());
            assert!(vote.has_opinion(), "{} abstained at its minimum", analyzer.kind());
        }
    }

    #[test]
    fn test_votes_in_evaluation_order() {
        let predictor = Predictor::with_defaults();
        let history = HistoryBuilder::from_pattern(&"HL".repeat(10)).records();
        let kinds: Vec<ModelKind> = predictor.votes(&history).iter().map(|v| v.model).collect();
        assert_eq!(kinds, vec![ModelKind::Streak, ModelKind::Balance, ModelKind::Pattern]);
    }
}
