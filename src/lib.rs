//! Sic Bo High/Low predictor
//!
//! Statistical ensemble over recent round history:
//! - streak / Markov transition analysis
//! - balance (mean reversion) analysis
//! - short pattern templates
//! - weighted aggregation and exact-total ranking

pub mod client;
pub mod config;
pub mod dice;
pub mod error;
pub mod history;
pub mod ml;
pub mod server;
pub mod testing;

pub use error::{PredictorError, Result};
