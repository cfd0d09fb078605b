//! Configuration module for the kline collector.

pub mod binance;
pub mod collector;
pub mod indicators;
pub mod persistence;
pub mod settings;

pub(crate) mod debug;

// Re-export commonly used items
pub use binance::{BINANCE, kline_stream_url};
pub use collector::{COLLECTOR, CollectorConfig};
pub use indicators::{INDICATORS, IndicatorConfig};
pub use persistence::{PERSISTENCE, series_filename};
pub use settings::CollectorSettings;
