use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::data::csv_store::read_candles;
use crate::data::kline_event::KlineEvent;
use crate::data::kline_stream::{CandleFeed, FeedItem};
use crate::domain::Candle;

/// Feeds recorded candles to the engine as closed klines, oldest first, then ends.
/// Used for offline backfill.
pub struct ReplayFeed {
    pending: VecDeque<KlineEvent>,
}

impl ReplayFeed {
    pub fn new(symbol: &str, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self {
            pending: candles
                .iter()
                .map(|candle| KlineEvent::closed(symbol, candle))
                .collect(),
        }
    }

    /// Any file `read_candles` accepts: a clean series or a bare OHLCV export.
    pub fn from_csv(path: &Path, symbol: &str) -> Result<Self> {
        let candles = read_candles(path)
            .with_context(|| format!("Failed to load replay file {}", path.display()))?;
        log::info!("Replaying {} candles from {}", candles.len(), path.display());
        Ok(Self::new(symbol, candles))
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl CandleFeed for ReplayFeed {
    async fn next_event(&mut self) -> Option<FeedItem> {
        self.pending.pop_front().map(Ok)
    }

    fn signature(&self) -> &'static str {
        "CSV replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimeUtils;
    use chrono::DateTime;

    #[tokio::test]
    async fn replays_in_time_order_then_ends() {
        let at = |minute: i64| {
            let ts = DateTime::from_timestamp_millis(minute * TimeUtils::MS_IN_MIN).unwrap();
            Candle::new(ts, 1.0, 2.0, 0.5, 1.5, 3.0)
        };
        let mut feed = ReplayFeed::new("btceur", vec![at(2), at(0), at(1)]);
        assert_eq!(feed.remaining(), 3);

        let mut minutes = Vec::new();
        while let Some(item) = feed.next_event().await {
            let event = item.unwrap();
            assert_eq!(event.is_closed, Some(true));
            assert!(event.is_for("BTCEUR"));
            minutes.push(event.to_candle().unwrap().timestamp_ms() / TimeUtils::MS_IN_MIN);
        }
        assert_eq!(minutes, vec![0, 1, 2]);
        assert!(feed.next_event().await.is_none());
    }
}
