use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::domain::Candle;
use crate::error::CollectorError;

/// Bounded, strictly time-ordered window of the most recent 1-minute candles.
/// Appending past capacity evicts from the front.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    capacity: usize,
    rows: VecDeque<Candle>,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rows: VecDeque::with_capacity(capacity.min(16_384)),
        }
    }

    /// Seed from previously persisted rows. Sorts, drops duplicate timestamps (first wins)
    /// and keeps only the newest `capacity`.
    pub fn from_candles(capacity: usize, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        let excess = candles.len().saturating_sub(capacity);

        let mut history = Self::new(capacity);
        history.rows.extend(candles.into_iter().skip(excess));
        history
    }

    /// Rejects anything not strictly after the newest row, leaving the window untouched.
    pub fn append(&mut self, candle: Candle) -> Result<(), CollectorError> {
        if let Some(last) = self.last_timestamp() {
            if candle.timestamp <= last {
                return Err(CollectorError::OutOfOrderAppend {
                    last,
                    candidate: candle.timestamp,
                });
            }
        }
        if self.capacity == 0 {
            return Ok(());
        }
        if self.rows.len() == self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(candle);
        Ok(())
    }

    /// Owned copy, oldest first. Later appends do not affect it.
    pub fn snapshot(&self) -> Vec<Candle> {
        self.rows.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.back().map(|c| c.timestamp)
    }
}
