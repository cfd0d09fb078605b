//! Flat CSV persistence for clean series: one file per (symbol, timeframe), rewritten in full
//! on every successful update.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
use crate::config::debug::PRINT_SERDE;
use crate::config::series_filename;
use crate::domain::{Candle, PairInterval, Timeframe};
use crate::error::CollectorError;
use crate::models::IndicatorRow;
use crate::utils::maths_utils::finite;
use crate::utils::time_utils::{epoch_ms_to_utc, format_iso_utc, parse_iso_utc};

/// Where clean series are read from at startup and written to after each update.
pub trait SeriesPersistence: Send {
    /// Initial 1-minute store content. A missing file is an empty history, not an error.
    fn load_base(&self) -> Result<Vec<Candle>>;

    /// Replace the stored series for `pair` with `rows`.
    fn save_series(&mut self, pair: &PairInterval, rows: &[IndicatorRow])
    -> Result<(), CollectorError>;
}

/// One CSV line. Field order is the column order on disk.
/// Every column after `timestamp` is optional so bare OHLCV files load too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesRecord {
    #[serde(alias = "Timestamp", alias = "time")]
    pub timestamp: String,
    #[serde(default, alias = "Open")]
    pub open: Option<f64>,
    #[serde(default, alias = "High")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low")]
    pub low: Option<f64>,
    #[serde(default, alias = "Close")]
    pub close: Option<f64>,
    #[serde(default, alias = "Volume")]
    pub volume: Option<f64>,
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub ema12: Option<f64>,
    #[serde(default)]
    pub ema26: Option<f64>,
    #[serde(default)]
    pub ma7: Option<f64>,
    #[serde(default)]
    pub ma25: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub obv: Option<f64>,
    #[serde(default)]
    pub atr: Option<f64>,
    #[serde(default)]
    pub bb_ma: Option<f64>,
    #[serde(default)]
    pub bb_std: Option<f64>,
    #[serde(default)]
    pub bb_upper: Option<f64>,
    #[serde(default)]
    pub bb_lower: Option<f64>,
    #[serde(default)]
    pub bb_z: Option<f64>,
}

impl From<&IndicatorRow> for SeriesRecord {
    fn from(row: &IndicatorRow) -> Self {
        let c = &row.candle;
        Self {
            timestamp: format_iso_utc(&c.timestamp),
            open: finite(c.open),
            high: finite(c.high),
            low: finite(c.low),
            close: finite(c.close),
            volume: finite(c.volume),
            rsi: row.rsi,
            ema12: row.ema12,
            ema26: row.ema26,
            ma7: row.ma7,
            ma25: row.ma25,
            macd: row.macd,
            obv: row.obv,
            atr: row.atr,
            bb_ma: row.bb_ma,
            bb_std: row.bb_std,
            bb_upper: row.bb_upper,
            bb_lower: row.bb_lower,
            bb_z: row.bb_z,
        }
    }
}

impl SeriesRecord {
    /// Only the price part survives; indicators are always recomputed.
    /// Missing price cells come back as NaN so the row is visibly incomplete.
    pub fn to_candle(&self) -> Option<Candle> {
        let price = |cell: Option<f64>| cell.unwrap_or(f64::NAN);
        Some(Candle::new(
            parse_timestamp_cell(&self.timestamp)?,
            price(self.open),
            price(self.high),
            price(self.low),
            price(self.close),
            price(self.volume),
        ))
    }
}

/// ISO-8601 in any layout `parse_iso_utc` accepts, or a bare epoch number
/// (13+ digits read as milliseconds, shorter as seconds).
fn parse_timestamp_cell(text: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    if let Some(ts) = parse_iso_utc(text) {
        return Some(ts);
    }
    let epoch: i64 = text.trim().parse().ok()?;
    if epoch.abs() >= 100_000_000_000 {
        epoch_ms_to_utc(epoch)
    } else {
        epoch_ms_to_utc(epoch.checked_mul(1000)?)
    }
}

/// Read every candle in a series file. Rows with an unreadable timestamp are skipped.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open series file: {}", path.display()))?;

    let mut candles = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<SeriesRecord>() {
        let record =
            result.with_context(|| format!("Failed to parse series file: {}", path.display()))?;
        match record.to_candle() {
            Some(candle) => candles.push(candle),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!(
            "Skipped {} rows with unreadable timestamps in {}",
            skipped,
            path.display()
        );
    }

    #[cfg(debug_assertions)]
    if PRINT_SERDE {
        log::info!("Read {} candles from {}", candles.len(), path.display());
    }
    Ok(candles)
}

/// Overwrite `path` with `rows`. Written to a sibling temp file first and renamed into place,
/// so readers only ever see the previous file or the new one.
pub fn write_rows(path: &Path, rows: &[IndicatorRow]) -> Result<(), CollectorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CollectorError::persistence(path, e))?;
    }
    let tmp_path = temp_path_for(path);

    let written = write_records(&tmp_path, rows)
        .and_then(|_| fs::rename(&tmp_path, path).map_err(csv::Error::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(CollectorError::persistence(path, e));
    }

    #[cfg(debug_assertions)]
    if PRINT_SERDE {
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}

fn write_records(path: &Path, rows: &[IndicatorRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(SeriesRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// The on-disk store: `<dir>/<base>_<quote>_<tf>_clean.csv`.
#[derive(Debug, Clone)]
pub struct CsvSeriesStore {
    dir: PathBuf,
    symbol: String,
}

impl CsvSeriesStore {
    pub fn new(dir: impl Into<PathBuf>, symbol: &str) -> Self {
        Self {
            dir: dir.into(),
            symbol: symbol.to_uppercase(),
        }
    }

    pub fn path_for(&self, timeframe: Timeframe) -> PathBuf {
        self.dir
            .join(series_filename(&self.symbol, timeframe.interval_ms()))
    }
}

impl SeriesPersistence for CsvSeriesStore {
    fn load_base(&self) -> Result<Vec<Candle>> {
        let path = self.path_for(Timeframe::ONE_MINUTE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_candles(&path)
    }

    fn save_series(
        &mut self,
        pair: &PairInterval,
        rows: &[IndicatorRow],
    ) -> Result<(), CollectorError> {
        write_rows(&self.path_for(pair.timeframe), rows)
    }
}
