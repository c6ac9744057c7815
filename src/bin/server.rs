//! Sic Bo prediction API server

use std::sync::Arc;

use sicbo_predictor::client::HistoryClient;
use sicbo_predictor::config::AppConfig;
use sicbo_predictor::ml::Predictor;
use sicbo_predictor::server::{create_router, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::new(config.log_directives(std::env::var("RUST_LOG").ok()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let source = HistoryClient::new(config.upstream.clone())?;
    let predictor = Predictor::new(config.engine.weights.clone());
    let state = Arc::new(AppState::new(source, predictor));
    let app = create_router(state, &config.server.route);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Sic Bo predictor listening on http://{}{}", addr, config.server.route);
    info!("⚠️ Statistical analysis only; outcomes are random");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
