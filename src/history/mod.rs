//! Outcome history
//!
//! Upstream records are normalized once at the boundary into well-typed
//! [`OutcomeRecord`]s, then classified into [`ClassifiedStatus`] for the
//! analyzers. History is always ordered newest first (index 0 = latest round).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dice::{MAX_SUM, MIN_SUM};

/// Lowest total classified as High
pub const HIGH_MIN_SUM: u8 = 11;

/// Binary outcome class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeClass {
    /// Sum 11..=18
    High,
    /// Sum 3..=10, and degenerate records
    Low,
}

impl OutcomeClass {
    pub fn from_sum(sum: u8) -> Self {
        if (HIGH_MIN_SUM..=MAX_SUM).contains(&sum) {
            Self::High
        } else {
            Self::Low
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }

    /// Single-letter code used in transition keys and logs
    pub fn code(&self) -> char {
        match self {
            Self::High => 'H',
            Self::Low => 'L',
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn from_sum(sum: u8) -> Self {
        if sum % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

/// Upstream wire record; every field is optional and loosely typed
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawOutcome {
    #[serde(rename = "gameNum", default)]
    pub game_num: Option<serde_json::Value>,
    #[serde(default)]
    pub score: Option<serde_json::Value>,
    #[serde(rename = "facesList", default)]
    pub faces_list: Option<Vec<serde_json::Value>>,
}

/// A validated round result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Round identifier as sent upstream, e.g. "#1234567"
    pub sequence_id: String,
    /// Dice total; `None` when the upstream value was missing or invalid
    pub sum: Option<u8>,
    /// Individual faces, informational only
    pub dice: Option<[u8; 3]>,
    /// Integer score as reported, before the 3..=18 range check
    #[serde(default)]
    pub raw_score: Option<i64>,
}

impl OutcomeRecord {
    pub fn new(sequence_id: impl Into<String>, sum: u8) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            sum: (MIN_SUM..=MAX_SUM).contains(&sum).then_some(sum),
            dice: None,
            raw_score: Some(i64::from(sum)),
        }
    }

    /// Build a record from three faces; the sum is derived from them
    pub fn from_dice(sequence_id: impl Into<String>, dice: [u8; 3]) -> Self {
        let valid = dice.iter().all(|d| (1..=6).contains(d));
        let sum: Option<u8> = valid.then(|| dice.iter().sum());
        Self {
            sequence_id: sequence_id.into(),
            sum,
            dice: valid.then_some(dice),
            raw_score: sum.map(i64::from),
        }
    }

    /// Normalize an upstream record
    pub fn from_raw(raw: &RawOutcome) -> Self {
        let sequence_id = match &raw.game_num {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let raw_score = raw.score.as_ref().and_then(json_integer);
        let sum = raw_score
            .filter(|s| (i64::from(MIN_SUM)..=i64::from(MAX_SUM)).contains(s))
            .map(|s| s as u8);

        let dice = raw.faces_list.as_ref().and_then(|faces| {
            let faces: Vec<u8> = faces
                .iter()
                .filter_map(json_integer)
                .filter(|f| (1..=6).contains(f))
                .map(|f| f as u8)
                .collect();
            <[u8; 3]>::try_from(faces.as_slice()).ok()
        });

        Self {
            sequence_id,
            sum,
            dice,
            raw_score,
        }
    }

    /// Numeric round id with the optional '#' prefix stripped
    pub fn round_number(&self) -> Option<i64> {
        self.sequence_id
            .trim_start_matches('#')
            .trim()
            .parse::<i64>()
            .ok()
    }

    /// Identifier of the round following this one
    pub fn next_sequence_id(&self) -> Option<String> {
        self.round_number()
            .and_then(|n| n.checked_add(1))
            .map(|n| n.to_string())
    }
}

fn json_integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Normalize a whole upstream page, preserving order
pub fn normalize(raw: &[RawOutcome]) -> Vec<OutcomeRecord> {
    raw.iter().map(OutcomeRecord::from_raw).collect()
}

/// How a status was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    /// Derived from a valid dice total
    Scored,
    /// Missing or invalid total: treated as sum 0, Low, Even
    Degenerate,
}

/// Classified view of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedStatus {
    pub sequence_id: String,
    pub sum: u8,
    pub outcome_class: OutcomeClass,
    pub parity: Parity,
    pub kind: StatusKind,
}

impl ClassifiedStatus {
    pub fn is_degenerate(&self) -> bool {
        self.kind == StatusKind::Degenerate
    }
}

/// Status Deriver: total and deterministic
pub fn derive_status(record: &OutcomeRecord) -> ClassifiedStatus {
    match record.sum {
        Some(sum) => ClassifiedStatus {
            sequence_id: record.sequence_id.clone(),
            sum,
            outcome_class: OutcomeClass::from_sum(sum),
            parity: Parity::from_sum(sum),
            kind: StatusKind::Scored,
        },
        None => ClassifiedStatus {
            sequence_id: record.sequence_id.clone(),
            sum: 0,
            outcome_class: OutcomeClass::Low,
            parity: Parity::Even,
            kind: StatusKind::Degenerate,
        },
    }
}

/// Classify a whole history, preserving order
pub fn classify(history: &[OutcomeRecord]) -> Vec<ClassifiedStatus> {
    history.iter().map(derive_status).collect()
}
