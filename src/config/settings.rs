//! Runtime settings: the const defaults, overridden from the command line.

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::Cli;
use crate::config::{COLLECTOR, PERSISTENCE};
use crate::domain::Timeframe;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorSettings {
    pub symbol: String,
    pub data_dir: PathBuf,
    pub window_capacity: usize,
    pub warmup_rows: usize,
    pub skip_rows: usize,
    pub base_min_rows: usize,
    pub timeframe_min_rows: usize,
    pub timeframes: Vec<Timeframe>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            symbol: COLLECTOR.default_symbol.to_string(),
            data_dir: PathBuf::from(PERSISTENCE.directory),
            window_capacity: COLLECTOR.window_capacity,
            warmup_rows: COLLECTOR.warmup_rows,
            skip_rows: COLLECTOR.imputation.skip_rows,
            base_min_rows: COLLECTOR.imputation.base_min_rows,
            timeframe_min_rows: COLLECTOR.imputation.timeframe_min_rows,
            timeframes: COLLECTOR
                .default_timeframes_ms
                .iter()
                .filter_map(|&ms| Timeframe::from_ms(ms))
                .collect(),
        }
    }
}

impl CollectorSettings {
    pub fn from_cli(args: &Cli) -> Result<Self> {
        let defaults = Self::default();

        let timeframes = match &args.timeframes {
            Some(list) => parse_timeframes(list)?,
            None => defaults.timeframes,
        };

        let window_capacity = args.capacity.unwrap_or(defaults.window_capacity);
        if window_capacity == 0 {
            bail!("--capacity must be at least 1");
        }

        Ok(Self {
            symbol: args
                .symbol
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or(defaults.symbol),
            data_dir: args.data_dir.clone().unwrap_or(defaults.data_dir),
            window_capacity,
            warmup_rows: defaults.warmup_rows,
            skip_rows: args.skip_rows.unwrap_or(defaults.skip_rows),
            base_min_rows: args.base_min_rows.unwrap_or(defaults.base_min_rows),
            timeframe_min_rows: args
                .timeframe_min_rows
                .unwrap_or(defaults.timeframe_min_rows),
            timeframes,
        })
    }
}

/// Comma-separated Binance shorthand, e.g. `5m,15m,1h`. Duplicates are dropped, order kept.
fn parse_timeframes(list: &str) -> Result<Vec<Timeframe>> {
    let mut timeframes: Vec<Timeframe> = Vec::new();
    for label in list.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        let timeframe: Timeframe = match label.parse() {
            Ok(tf) => tf,
            Err(e) => bail!("{}", e),
        };
        if timeframe.interval_ms() <= COLLECTOR.base_interval_ms {
            bail!("timeframe '{}' must be coarser than the 1m base series", label);
        }
        if !timeframes.contains(&timeframe) {
            timeframes.push(timeframe);
        }
    }
    Ok(timeframes)
}
