//! Timeframe Aggregator: re-buckets the clean 1-minute series into coarser bars and
//! re-derives indicators on them.

use chrono::DateTime;
use itertools::Itertools;
use rayon::prelude::*;

use crate::analysis::imputation::{self, CleanSpec};
use crate::analysis::indicators;
use crate::config::CollectorSettings;
use crate::domain::{Candle, Timeframe};
use crate::models::IndicatorRow;

/// Collapse consecutive rows into one OHLCV bar per epoch-aligned bucket.
/// Each bar is stamped with its bucket start. Input must be in timestamp order.
pub fn resample(rows: &[IndicatorRow], timeframe: Timeframe) -> Vec<Candle> {
    let buckets = rows
        .iter()
        .map(|row| &row.candle)
        .chunk_by(|candle| timeframe.bucket_start_ms(candle.timestamp_ms()));

    buckets
        .into_iter()
        .filter_map(|(bucket_start_ms, bucket)| {
            let bucket: Vec<&Candle> = bucket.collect();
            let first = bucket.first()?;
            let last = bucket.last()?;
            let bar = Candle::new(
                DateTime::from_timestamp_millis(bucket_start_ms)?,
                first.open,
                bucket.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
                bucket.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
                last.close,
                bucket.iter().map(|c| c.volume).sum(),
            );
            // Only possible when the source had holes
            bar.is_complete().then_some(bar)
        })
        .collect()
}

/// Full aggregate for one timeframe: resample, indicators, clean, then keep the newest
/// `window_capacity` rows. `None` means not enough bars yet.
pub fn aggregate(
    clean_base: &[IndicatorRow],
    timeframe: Timeframe,
    settings: &CollectorSettings,
) -> Option<Vec<IndicatorRow>> {
    let bars = resample(clean_base, timeframe);
    let with_indicators = indicators::compute(&bars);
    let spec = CleanSpec::all_columns(settings.skip_rows, settings.timeframe_min_rows);
    let mut cleaned = imputation::clean(&with_indicators, &spec)?;

    if cleaned.len() > settings.window_capacity {
        let excess = cleaned.len() - settings.window_capacity;
        cleaned.drain(..excess);
    }
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Every configured timeframe, computed in parallel from one immutable snapshot.
/// Results come back in the configured order.
pub fn aggregate_all(
    clean_base: &[IndicatorRow],
    settings: &CollectorSettings,
) -> Vec<(Timeframe, Option<Vec<IndicatorRow>>)> {
    settings
        .timeframes
        .par_iter()
        .map(|&timeframe| (timeframe, aggregate(clean_base, timeframe, settings)))
        .collect()
}
