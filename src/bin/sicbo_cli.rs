//! Sic Bo Predictor CLI
//!
//! Commands:
//! - fetch: Pull live history and predict the next round
//! - file: Predict from a saved upstream response
//! - distribution: Print the theoretical sum table

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use sicbo_predictor::client::{read_history_file, HistoryClient};
use sicbo_predictor::config::AppConfig;
use sicbo_predictor::dice::SumDistribution;
use sicbo_predictor::history::OutcomeRecord;
use sicbo_predictor::ml::Predictor;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sicbo")]
#[command(about = "Sic Bo High/Low predictor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch live history and predict
    Fetch,
    /// Predict from a saved history file
    File {
        /// Upstream JSON response or bare resultList array
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Show the theoretical distribution of three-dice totals
    Distribution,
}

fn predict(predictor: &Predictor, records: &[OutcomeRecord]) -> anyhow::Result<()> {
    let result = predictor.predict(records);
    let output = json!({
        "rounds": records.len(),
        "latest": records.first().map(|r| &r.sequence_id),
        "prediction": result,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            config.log_directives(std::env::var("RUST_LOG").ok()),
        ))
        .with_writer(std::io::stderr)
        .init();

    let predictor = Predictor::new(config.engine.weights.clone());

    match cli.command {
        Commands::Fetch => {
            let client = HistoryClient::new(config.upstream.clone())?;
            let snapshot = client.fetch().await?;
            predict(&predictor, &snapshot.records)?;
        }
        Commands::File { path } => {
            let records = read_history_file(&path)?;
            predict(&predictor, &records)?;
        }
        Commands::Distribution => {
            let table = SumDistribution::new();
            for (sum, count, probability) in table.rows() {
                println!("{:>2}  {:>3}/216  {:.4}", sum, count, probability);
            }
        }
    }

    Ok(())
}
