use chrono::{DateTime, Utc};

// One OHLCV observation. Timestamps are the candle's close time as reported by the feed,
// or the bucket start for aggregated bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    // A price or volume cell read back as NaN means the source had a hole there.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }

    // Close as an optional cell, so missing closes flow through indicator windows as gaps.
    pub fn close_cell(&self) -> Option<f64> {
        self.close.is_finite().then_some(self.close)
    }
}
