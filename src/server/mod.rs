//! Axum HTTP server: prediction endpoint for the Tài/Xỉu frontend.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `{server.route}` | Fetch history, predict the next round |
//!
//! Localized labels ("Tài"/"Xỉu") exist only here; the engine speaks
//! `OutcomeClass`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::client::{HistorySnapshot, HistorySource};
use crate::error::PredictorError;
use crate::history::{derive_status, OutcomeClass};
use crate::ml::{PredictionResult, Predictor};

pub const HIGH_LABEL: &str = "Tài";
pub const LOW_LABEL: &str = "Xỉu";

const NOT_AVAILABLE: &str = "N/A";
const ADVISORY_NOTE: &str = "KHÔNG NÊN ALL-IN";
const INSUFFICIENT_PREDICTION: &str = "Không đủ dữ liệu lịch sử để dự đoán.";
const INSUFFICIENT_EXPLANATION: &str = "Cần ít nhất 15 phiên để bắt đầu phân tích nâng cao.";
const INSUFFICIENT_NOTE: &str = "Đây là công cụ phân tích thống kê, không phải dự đoán chắc chắn.";

/// Shared handler state
pub struct AppState<S> {
    pub source: S,
    pub predictor: Predictor,
}

impl<S: HistorySource> AppState<S> {
    pub fn new(source: S, predictor: Predictor) -> Self {
        Self { source, predictor }
    }
}

pub fn create_router<S: HistorySource>(state: Arc<AppState<S>>, route: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route(route, get(handle_predict::<S>))
        .layer(cors)
        .with_state(state)
}

pub fn class_label(class: OutcomeClass) -> &'static str {
    match class {
        OutcomeClass::High => HIGH_LABEL,
        OutcomeClass::Low => LOW_LABEL,
    }
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": { "message": msg } })))
}

fn status_for(err: &PredictorError) -> StatusCode {
    if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Response body for a snapshot and its prediction
pub fn render_prediction(snapshot: &HistorySnapshot, result: &PredictionResult) -> Value {
    let (Some(latest), Some(final_class)) = (snapshot.latest(), result.final_class) else {
        return json!({
            "phien_sau": NOT_AVAILABLE,
            "du_doan": INSUFFICIENT_PREDICTION,
            "doan_vi": [],
            "do_tin_cay": "0%",
            "giai_thich": INSUFFICIENT_EXPLANATION,
            "luu_y": INSUFFICIENT_NOTE,
        });
    };

    let xuc_xac = latest
        .dice
        .map(|d| {
            d.iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(" - ")
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let status = derive_status(latest);

    json!({
        "phien_truoc": latest.sequence_id,
        "xuc_xac": xuc_xac,
        "tong": latest.raw_score.unwrap_or(0),
        "ket_qua": class_label(status.outcome_class),
        "phien_sau": latest
            .next_sequence_id()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        "du_doan": class_label(final_class),
        "doan_vi": result.top_sums,
        "do_tin_cay": format!("{}%", result.confidence.normalize()),
        "giai_thich": result.explanation(),
        "luu_y": ADVISORY_NOTE,
        "thoi_gian": snapshot.fetched_at.to_rfc3339(),
    })
}

async fn handle_health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn handle_predict<S: HistorySource>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let snapshot = state.source.fetch_history().await.map_err(|e| {
        error!("Prediction request failed: {}", e);
        error_response(status_for(&e), &e.to_string())
    })?;

    let result = state.predictor.predict(&snapshot.records);
    if result.is_sufficient() {
        info!(
            "Predicted {} at {}% from {} rounds",
            result.final_class.map(class_label).unwrap_or_default(),
            result.confidence,
            snapshot.records.len()
        );
    } else {
        info!("Insufficient history: {} rounds", snapshot.records.len());
    }

    Ok(Json(render_prediction(&snapshot, &result)))
}
