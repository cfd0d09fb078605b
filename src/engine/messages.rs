use crate::error::CollectorError;

/// What a single feed event led to.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Not for us: still-forming kline, another symbol or another interval
    Ignored,
    /// Dropped; the store is unchanged
    Rejected(CollectorError),
    /// Appended, but the store is still below the warm-up size
    Waiting { rows: usize },
    /// Appended, but too few rows survived cleaning. Nothing was written.
    InsufficientData { rows: usize },
    /// The 1m series could not be written. No timeframe was touched, so every file on disk
    /// still reflects the previous update.
    BaseWriteFailed(CollectorError),
    /// The 1m series was written, followed by every timeframe with enough bars. Timeframe write
    /// failures are counted, not fatal.
    Published {
        base_rows: usize,
        timeframes_written: usize,
        timeframes_skipped: usize,
        failed_writes: usize,
    },
}
