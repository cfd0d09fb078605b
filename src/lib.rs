#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod models;
pub mod utils;

// The engine
pub mod engine;

// Re-export commonly used types
pub use config::CollectorSettings;
pub use data::{BinanceKlineFeed, CandleFeed, CsvSeriesStore, ReplayFeed, RollingHistory};
pub use domain::{Candle, PairInterval, Timeframe};
pub use engine::{CollectorEngine, UpdateOutcome};
pub use error::CollectorError;
pub use models::IndicatorRow;

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Trading pair to collect, e.g. BTCEUR
    #[arg(long)]
    pub symbol: Option<String>,

    /// Directory holding the clean series files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Rows kept in memory and in every written series
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Comma-separated timeframes to derive from the 1m series, e.g. 5m,15m,1h
    #[arg(long)]
    pub timeframes: Option<String>,

    /// Minimum clean 1m rows before anything is written
    #[arg(long)]
    pub base_min_rows: Option<usize>,

    /// Minimum clean rows per derived timeframe
    #[arg(long)]
    pub timeframe_min_rows: Option<usize>,

    /// Leading rows dropped before cleaning
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Feed candles from this CSV instead of the live stream
    #[arg(long)]
    pub replay: Option<PathBuf>,
}
