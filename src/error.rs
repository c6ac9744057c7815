//! Error types
//!
//! The prediction engine itself is total and never returns these; they cover
//! the history fetch, configuration and the HTTP surface.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    /// Transport-level HTTP failure (connect, DNS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transient failures persisted past the retry budget
    #[error("history fetch failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PredictorError {
    /// Whether a retry may succeed: 5xx, timeouts, connection/DNS failures,
    /// requests that never produced a response, or a body cut off mid-read
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status >= 500,
            Self::Http(e) => {
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
            }
            _ => false,
        }
    }

    /// Whether the failure came from the history source
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Upstream { .. } | Self::RetriesExhausted { .. } | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_classification() {
        let server = PredictorError::Upstream { status: 503, body: String::new() };
        assert!(server.is_transient());

        let client = PredictorError::Upstream { status: 404, body: "missing".into() };
        assert!(!client.is_transient());
        assert!(client.is_upstream());
    }

    #[test]
    fn test_non_network_errors_not_transient() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!PredictorError::from(json).is_transient());
        assert!(!PredictorError::Config("bad".into()).is_transient());
        assert!(!PredictorError::Config("bad".into()).is_upstream());
    }

    #[test]
    fn test_display() {
        let err = PredictorError::RetriesExhausted { attempts: 8, last: "timeout".into() };
        assert_eq!(err.to_string(), "history fetch failed after 8 attempts: timeout");
    }
}
