//! Ensemble vote aggregation
//!
//! Combines analyzer votes into one class and confidence:
//! - Weighted voting (certainty x static model weight)
//! - Majority-by-score resolution with a High default on ties
//! - Agreement dampening when fewer than two models back the result

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{round_percent, ModelKind, ModelVote};
use crate::history::OutcomeClass;

/// Confidence reported when there is no usable signal or an exact tie
pub const NEUTRAL_CONFIDENCE: Decimal = dec!(50);
/// Models that must agree with the result to avoid dampening
pub const MIN_AGREEMENT: usize = 2;
/// Confidence ceiling applied when agreement is too thin
pub const DAMPENED_CONFIDENCE_CAP: Decimal = dec!(60);

const NO_SIGNAL_RATIONALE: &str =
    "Ensemble: insufficient signal from all models, defaulting to an even-odds call.";

/// Static per-model weights, injected at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelWeights {
    pub streak: Decimal,
    pub balance: Decimal,
    pub pattern: Decimal,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            streak: dec!(1.0),
            balance: dec!(1.0),
            pattern: dec!(1.0),
        }
    }
}

impl ModelWeights {
    pub fn get(&self, model: ModelKind) -> Decimal {
        match model {
            ModelKind::Streak => self.streak,
            ModelKind::Balance => self.balance,
            ModelKind::Pattern => self.pattern,
        }
    }
}

/// Contribution of a single model to the ensemble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelContribution {
    pub model: ModelKind,
    pub predicted_class: OutcomeClass,
    pub certainty: Decimal,
    pub weight: Decimal,
    /// certainty x weight
    pub score: Decimal,
}

/// Ensemble decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub final_class: OutcomeClass,
    /// 0-100
    pub confidence: Decimal,
    /// Contributing models in evaluation order
    pub contributions: Vec<ModelContribution>,
    /// Rationales in evaluation order
    pub explanations: Vec<String>,
    /// Contributing models whose class matches `final_class`
    pub agreement: usize,
}

impl AggregateResult {
    pub fn contribution(&self, model: ModelKind) -> Option<&ModelContribution> {
        self.contributions.iter().find(|c| c.model == model)
    }
}

/// Weighted voting aggregator
#[derive(Debug, Clone, Default)]
pub struct WeightedAggregator {
    weights: ModelWeights,
}

impl WeightedAggregator {
    pub fn new(weights: ModelWeights) -> Self {
        Self { weights }
    }

    pub fn with_defaults() -> Self {
        Self::new(ModelWeights::default())
    }

    /// Combine votes; abstaining votes are skipped
    pub fn aggregate(&self, votes: &[ModelVote]) -> AggregateResult {
        let mut high_score = Decimal::ZERO;
        let mut low_score = Decimal::ZERO;
        let mut explanations = Vec::new();
        let mut contributions = Vec::new();

        for vote in votes {
            let Some(class) = vote.predicted_class else {
                continue;
            };
            let weight = self.weights.get(vote.model);
            let score = vote.certainty * weight;

            match class {
                OutcomeClass::High => high_score += score,
                OutcomeClass::Low => low_score += score,
            }
            explanations.push(vote.rationale.clone());
            contributions.push(ModelContribution {
                model: vote.model,
                predicted_class: class,
                certainty: vote.certainty,
                weight,
                score,
            });
        }

        let total = high_score + low_score;
        let (final_class, mut confidence) = if total == Decimal::ZERO {
            explanations.push(NO_SIGNAL_RATIONALE.to_string());
            (OutcomeClass::High, NEUTRAL_CONFIDENCE)
        } else if high_score > low_score {
            (OutcomeClass::High, round_percent(high_score * dec!(100) / total))
        } else if low_score > high_score {
            (OutcomeClass::Low, round_percent(low_score * dec!(100) / total))
        } else {
            (OutcomeClass::High, NEUTRAL_CONFIDENCE)
        };

        let agreement = self.calculate_agreement(&contributions, final_class);
        if agreement < MIN_AGREEMENT {
            confidence = confidence.min(DAMPENED_CONFIDENCE_CAP);
        }

        AggregateResult {
            final_class,
            confidence,
            contributions,
            explanations,
            agreement,
        }
    }

    /// Number of contributing models that voted for `final_class`
    fn calculate_agreement(
        &self,
        contributions: &[ModelContribution],
        final_class: OutcomeClass,
    ) -> usize {
        contributions
            .iter()
            .filter(|c| c.predicted_class == final_class)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(model: ModelKind, class: OutcomeClass, certainty: Decimal) -> ModelVote {
        ModelVote::predict(model, class, certainty, format!("{} vote", model))
    }

    #[test]
    fn test_no_votes_defaults_high() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            ModelVote::abstain(ModelKind::Streak, "s"),
            ModelVote::abstain(ModelKind::Balance, "b"),
            ModelVote::abstain(ModelKind::Pattern, "p"),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::High);
        assert_eq!(result.confidence, dec!(50));
        assert!(result.contributions.is_empty());
        assert_eq!(result.explanations, vec![NO_SIGNAL_RATIONALE.to_string()]);
    }

    #[test]
    fn test_unanimous_vote() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::Low, dec!(70)),
            vote(ModelKind::Balance, OutcomeClass::Low, dec!(50)),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::Low);
        assert_eq!(result.confidence, dec!(100));
        assert_eq!(result.agreement, 2);
        assert_eq!(result.explanations, vec!["streak vote", "balance vote"]);
    }

    #[test]
    fn test_split_vote_is_dampened() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::High, dec!(80)),
            vote(ModelKind::Pattern, OutcomeClass::Low, dec!(20)),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::High);
        // 80% by score, but only one model agrees
        assert_eq!(result.confidence, dec!(60));
        assert_eq!(result.agreement, 1);
    }

    #[test]
    fn test_majority_confidence_rounding() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::High, dec!(67)),
            vote(ModelKind::Balance, OutcomeClass::High, dec!(50)),
            vote(ModelKind::Pattern, OutcomeClass::Low, dec!(75)),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::High);
        // 117 / 192 = 60.9375
        assert_eq!(result.confidence, dec!(61));
        assert_eq!(result.agreement, 2);
    }

    #[test]
    fn test_exact_tie_defaults_high() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::High, dec!(70)),
            vote(ModelKind::Pattern, OutcomeClass::Low, dec!(70)),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::High);
        assert_eq!(result.confidence, dec!(50));
    }

    #[test]
    fn test_custom_weights() {
        let aggregator = WeightedAggregator::new(ModelWeights {
            streak: dec!(0.5),
            ..Default::default()
        });
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::High, dec!(80)),
            vote(ModelKind::Pattern, OutcomeClass::Low, dec!(70)),
        ];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::Low);
        let streak = result.contribution(ModelKind::Streak).unwrap();
        assert_eq!(streak.score, dec!(40));
        assert_eq!(streak.weight, dec!(0.5));
    }

    #[test]
    fn test_zero_weights_fall_back_to_default() {
        let aggregator = WeightedAggregator::new(ModelWeights {
            streak: Decimal::ZERO,
            balance: Decimal::ZERO,
            pattern: Decimal::ZERO,
        });
        let votes = vec![vote(ModelKind::Streak, OutcomeClass::Low, dec!(80))];

        let result = aggregator.aggregate(&votes);
        assert_eq!(result.final_class, OutcomeClass::High);
        assert_eq!(result.confidence, dec!(50));
        assert_eq!(result.explanations.len(), 2);
    }

    #[test]
    fn test_contributions_preserve_order() {
        let aggregator = WeightedAggregator::with_defaults();
        let votes = vec![
            vote(ModelKind::Streak, OutcomeClass::High, dec!(60)),
            ModelVote::abstain(ModelKind::Balance, "none"),
            vote(ModelKind::Pattern, OutcomeClass::High, dec!(75)),
        ];

        let result = aggregator.aggregate(&votes);
        let order: Vec<ModelKind> = result.contributions.iter().map(|c| c.model).collect();
        assert_eq!(order, vec![ModelKind::Streak, ModelKind::Pattern]);
        assert!(result.contribution(ModelKind::Balance).is_none());
    }
}
