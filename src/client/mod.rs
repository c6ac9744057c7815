//! History sources
//!
//! - `HistoryClient`: live upstream feed over HTTP with retry/backoff
//! - `StaticHistory`: fixed snapshot (saved files, tests)
//!
//! The engine only ever sees the resulting newest-first `OutcomeRecord`s.

pub mod history;

pub use history::{parse_history_page, read_history_file, HistoryClient};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;

use crate::error::Result;
use crate::history::OutcomeRecord;

/// A fetched history, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub records: Vec<OutcomeRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl HistorySnapshot {
    pub fn latest(&self) -> Option<&OutcomeRecord> {
        self.records.first()
    }
}

/// Supplies the engine with an ordered history
pub trait HistorySource: Send + Sync + 'static {
    fn fetch_history(&self) -> impl Future<Output = Result<HistorySnapshot>> + Send;
}

/// Source that always returns the same records
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    records: Vec<OutcomeRecord>,
}

impl StaticHistory {
    pub fn new(records: Vec<OutcomeRecord>) -> Self {
        Self { records }
    }
}

impl HistorySource for StaticHistory {
    async fn fetch_history(&self) -> Result<HistorySnapshot> {
        Ok(HistorySnapshot {
            records: self.records.clone(),
            fetched_at: Utc::now(),
        })
    }
}
