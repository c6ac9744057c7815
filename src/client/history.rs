//! Upstream history client
//!
//! Protocol:
//! - GET {url}?gameId=..&size=..&tableId=..&curPage=1
//! - Body: {"data": {"resultList": [{"gameNum", "score", "facesList"}, ...]}}, newest first
//!
//! Transient failures (5xx, timeouts, connection/DNS errors) are retried with
//! exponential backoff; anything else is returned immediately.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::{HistorySnapshot, HistorySource};
use crate::config::UpstreamConfig;
use crate::error::{PredictorError, Result};
use crate::history::{normalize, OutcomeRecord, RawOutcome};

#[derive(Debug, Default, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Option<HistoryData>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryData {
    #[serde(rename = "resultList", default)]
    result_list: Option<Vec<RawOutcome>>,
}

/// Parse an upstream page, or a bare `resultList` array, into records
pub fn parse_history_page(body: &str) -> Result<Vec<OutcomeRecord>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let raw: Vec<RawOutcome> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        let response: HistoryResponse = serde_json::from_value(value)?;
        response
            .data
            .and_then(|d| d.result_list)
            .unwrap_or_default()
    };
    Ok(normalize(&raw))
}

/// Read a saved history file (upstream page or bare array)
pub fn read_history_file(path: impl AsRef<Path>) -> Result<Vec<OutcomeRecord>> {
    let body = fs::read_to_string(path)?;
    parse_history_page(&body)
}

/// HTTP history source with retry
#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: Client,
    config: UpstreamConfig,
}

impl HistoryClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn fetch_once(&self) -> Result<Vec<OutcomeRecord>> {
        let page_size = self.config.page_size.to_string();
        let resp = self
            .http
            .get(&self.config.url)
            .query(&[
                ("gameId", self.config.game_id.as_str()),
                ("size", page_size.as_str()),
                ("tableId", self.config.table_id.as_str()),
                ("curPage", "1"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictorError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        parse_history_page(&body)
    }

    /// Fetch the newest page, retrying transient failures up to `max_retries` times
    pub async fn fetch(&self) -> Result<HistorySnapshot> {
        let mut attempt = 0u32;

        loop {
            debug!("Fetching history (attempt {})", attempt + 1);

            match self.fetch_once().await {
                Ok(records) => {
                    info!("Fetched history from upstream, {} rounds", records.len());
                    return Ok(HistorySnapshot {
                        records,
                        fetched_at: Utc::now(),
                    });
                }
                Err(e) if e.is_transient() => {
                    if attempt >= self.config.max_retries {
                        error!("History fetch giving up after {} attempts: {}", attempt + 1, e);
                        return Err(PredictorError::RetriesExhausted {
                            attempts: attempt + 1,
                            last: e.to_string(),
                        });
                    }
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        "History fetch failed ({}), retry {}/{} in {}ms",
                        e,
                        attempt,
                        self.config.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("History fetch failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

impl HistorySource for HistoryClient {
    async fn fetch_history(&self) -> Result<HistorySnapshot> {
        self.fetch().await
    }
}
