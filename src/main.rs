use anyhow::{Context, Result};
use clap::Parser;

use kline_collector::{
    BinanceKlineFeed, CandleFeed, Cli, CollectorEngine, CollectorSettings, CsvSeriesStore,
    ReplayFeed, engine::run_event_loop,
};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let settings = CollectorSettings::from_cli(&args).context("Invalid command line")?;

    // C. Runtime
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    rt.block_on(async move {
        // D. Restore the rolling window from the last clean 1m file
        let store = CsvSeriesStore::new(&settings.data_dir, &settings.symbol);
        let symbol = settings.symbol.clone();
        let mut engine = CollectorEngine::new(settings, store);

        // E. Pick the feed
        let mut feed: Box<dyn CandleFeed> = match &args.replay {
            Some(path) => Box::new(ReplayFeed::from_csv(path, &symbol)?),
            None => Box::new(BinanceKlineFeed::connect(&symbol)),
        };

        // F. Run until the feed ends or Ctrl-C
        run_event_loop(&mut engine, feed.as_mut()).await;
        Ok::<(), anyhow::Error>(())
    })
}
