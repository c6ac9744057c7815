//! Test data generators
//!
//! Builds newest-first histories from compact descriptions:
//! - `from_pattern("HHLH")`: one round per character, 'H' = High, 'L' = Low,
//!   anything else = degenerate record (missing sum)
//! - `from_sums(&[12, 7, ...])`: exact totals
//!
//! Also renders the upstream JSON page for client and server tests.

use serde_json::json;

use crate::history::{classify, ClassifiedStatus, OutcomeRecord};

/// Total used for a generic High round
pub const HIGH_SAMPLE_SUM: u8 = 14;
/// Total used for a generic Low round
pub const LOW_SAMPLE_SUM: u8 = 7;

const FIRST_ROUND: u64 = 1_000_000;

/// Newest-first history builder
#[derive(Debug, Clone, Default)]
pub struct HistoryBuilder {
    sums: Vec<Option<u8>>,
}

impl HistoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pattern(pattern: &str) -> Self {
        let sums = pattern
            .chars()
            .map(|c| match c {
                'H' | 'h' => Some(HIGH_SAMPLE_SUM),
                'L' | 'l' => Some(LOW_SAMPLE_SUM),
                _ => None,
            })
            .collect();
        Self { sums }
    }

    pub fn from_sums(sums: &[u8]) -> Self {
        Self {
            sums: sums.iter().map(|&s| Some(s)).collect(),
        }
    }

    /// Append an older round
    pub fn then(mut self, sum: u8) -> Self {
        self.sums.push(Some(sum));
        self
    }

    /// Append an older round with a missing total
    pub fn then_degenerate(mut self) -> Self {
        self.sums.push(None);
        self
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Round id of entry `index`; the newest round has the largest number
    fn round_id(&self, index: usize) -> String {
        format!("#{}", FIRST_ROUND + (self.sums.len() - 1 - index) as u64)
    }

    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.sums
            .iter()
            .enumerate()
            .map(|(i, sum)| match sum.and_then(faces_for_sum) {
                Some(dice) => OutcomeRecord::from_dice(self.round_id(i), dice),
                None => OutcomeRecord {
                    sequence_id: self.round_id(i),
                    sum: None,
                    dice: None,
                    raw_score: None,
                },
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<ClassifiedStatus> {
        classify(&self.records())
    }

    /// Upstream response body: `{ "data": { "resultList": [...] } }`
    pub fn upstream_page(&self) -> serde_json::Value {
        let list: Vec<serde_json::Value> = self
            .sums
            .iter()
            .enumerate()
            .map(|(i, sum)| match sum.and_then(faces_for_sum) {
                Some(dice) => json!({
                    "gameNum": self.round_id(i),
                    "score": sum,
                    "facesList": dice,
                }),
                None => json!({ "gameNum": self.round_id(i) }),
            })
            .collect();
        json!({ "code": 0, "data": { "resultList": list } })
    }
}

/// A deterministic set of faces adding up to `sum` (3..=18)
pub fn faces_for_sum(sum: u8) -> Option<[u8; 3]> {
    if !(3..=18).contains(&sum) {
        return None;
    }
    let d1 = (sum - 2).min(6);
    let rest = sum - d1;
    let d2 = (rest - 1).min(6);
    Some([d1, d2, rest - d2])
}
