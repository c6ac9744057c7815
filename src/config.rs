//! Application configuration
//!
//! Resolution order: built-in defaults, then an optional TOML file
//! (`SICBO_CONFIG`, else `config/sicbo.toml` when present), then environment
//! overrides (`PORT`, `SICBO_UPSTREAM_URL`, `SICBO_LOG_LEVEL`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{PredictorError, Result};
use crate::ml::ModelWeights;

pub const DEFAULT_CONFIG_PATH: &str = "config/sicbo.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub engine: EngineConfig,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            engine: EngineConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the prediction endpoint
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            route: "/api/sicbo/predict".to_string(),
        }
    }
}

/// History source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub url: String,
    pub game_id: String,
    pub table_id: String,
    /// Rounds requested per fetch
    pub page_size: u32,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Delay before retry n is base_delay_ms * 2^n
    pub base_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://api.wsktnus8.net/v2/history/getLastResult".to_string(),
            game_id: "ktrng_3979".to_string(),
            table_id: "39791215743193".to_string(),
            page_size: 100,
            timeout_ms: 15_000,
            max_retries: 7,
            base_delay_ms: 500,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Backoff before retry `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ModelWeights,
}

impl AppConfig {
    /// Defaults + optional file + environment
    pub fn load() -> Result<Self> {
        let mut config = match env::var("SICBO_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PredictorError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PredictorError::Config(format!("failed to parse config: {}", e)))
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("SICBO_UPSTREAM_URL") {
            self.upstream.url = url;
        }
        if let Some(level) = lookup("SICBO_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PredictorError::Config("server.port must be non-zero".into()));
        }
        if !self.server.route.starts_with('/') {
            return Err(PredictorError::Config(format!(
                "server.route must start with '/': {}",
                self.server.route
            )));
        }
        if self.upstream.url.trim().is_empty() {
            return Err(PredictorError::Config("upstream.url must be set".into()));
        }
        let weights = &self.engine.weights;
        for (name, weight) in [
            ("streak", weights.streak),
            ("balance", weights.balance),
            ("pattern", weights.pattern),
        ] {
            if weight < Decimal::ZERO {
                return Err(PredictorError::Config(format!(
                    "engine.weights.{} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Tracing filter directives: `RUST_LOG` when set and non-empty, else `log_level`
    pub fn log_directives(&self, rust_log: Option<String>) -> String {
        rust_log
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.log_level.clone())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
