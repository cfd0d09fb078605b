use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use kline_collector::analysis::aggregation::aggregate_all;
use kline_collector::data::SeriesPersistence;
use kline_collector::data::csv_store::read_candles;
use kline_collector::{Cli, CollectorSettings, CsvSeriesStore, IndicatorRow, PairInterval, Timeframe};

/// Rebuild every timeframe file from the saved clean 1m series.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct RebuildArgs {
    /// Trading pair whose files are rebuilt, e.g. BTCEUR
    #[arg(long)]
    symbol: Option<String>,

    /// Directory holding the clean series files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Rows kept in every written series
    #[arg(long)]
    capacity: Option<usize>,

    /// Comma-separated timeframes to rebuild, e.g. 5m,15m,1h
    #[arg(long)]
    timeframes: Option<String>,

    /// Minimum clean rows per rebuilt timeframe
    #[arg(long)]
    timeframe_min_rows: Option<usize>,

    /// Leading bars dropped before cleaning
    #[arg(long)]
    skip_rows: Option<usize>,
}

impl From<RebuildArgs> for Cli {
    fn from(args: RebuildArgs) -> Self {
        Cli {
            symbol: args.symbol,
            data_dir: args.data_dir,
            capacity: args.capacity,
            timeframes: args.timeframes,
            base_min_rows: None,
            timeframe_min_rows: args.timeframe_min_rows,
            skip_rows: args.skip_rows,
            replay: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::from(RebuildArgs::parse());
    let settings = CollectorSettings::from_cli(&cli).context("Invalid command line")?;
    rebuild_timeframes(&settings)
}

/// Regenerate every timeframe file from the persisted clean 1m series, without touching the feed
/// or the 1m file itself.
fn rebuild_timeframes(settings: &CollectorSettings) -> Result<()> {
    let mut store = CsvSeriesStore::new(&settings.data_dir, &settings.symbol);
    let source_path = store.path_for(Timeframe::ONE_MINUTE);
    let candles = read_candles(&source_path)
        .with_context(|| format!("Failed to load source series {:?}", source_path))?;

    println!("Loaded {} clean 1m rows from {:?}", candles.len(), source_path);

    // The file is already clean, so its rows feed the aggregator directly
    let base: Vec<IndicatorRow> = candles.into_iter().map(IndicatorRow::bare).collect();

    let mut failures = 0;
    for (timeframe, result) in aggregate_all(&base, settings) {
        let Some(series) = result else {
            println!("{}: not enough bars, skipped", timeframe);
            continue;
        };
        let pair = PairInterval::new(&settings.symbol, timeframe);
        match store.save_series(&pair, &series) {
            Ok(()) => println!(
                "✅ {} written to {:?} with {} rows.",
                pair,
                store.path_for(timeframe),
                series.len()
            ),
            Err(e) => {
                log::error!("{}: {:#}", pair, anyhow::Error::from(e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} timeframe files could not be written", failures);
    }
    Ok(())
}
