use std::future::Future;

use crate::data::{CandleFeed, SeriesPersistence};

use super::core::CollectorEngine;
use super::state::CollectorState;

/// Run until the feed ends or Ctrl-C.
pub async fn run_event_loop<P, F>(engine: &mut CollectorEngine<P>, feed: &mut F) -> CollectorState
where
    P: SeriesPersistence,
    F: CandleFeed + ?Sized,
{
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_until(engine, feed, ctrl_c).await
}

/// One event at a time: each update (including every timeframe write) finishes before the next
/// event is taken from the feed. Shutdown is only observed between events.
pub async fn run_until<P, F, S>(
    engine: &mut CollectorEngine<P>,
    feed: &mut F,
    shutdown: S,
) -> CollectorState
where
    P: SeriesPersistence,
    F: CandleFeed + ?Sized,
    S: Future<Output = ()>,
{
    log::info!("Listening for closed klines via {}", feed.signature());
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            item = feed.next_event() => match item {
                Some(item) => {
                    engine.handle_item(item);
                }
                None => {
                    log::info!("{} feed ended", feed.signature());
                    break;
                }
            },
            _ = &mut shutdown => {
                log::info!("Shutdown requested");
                break;
            }
        }
    }

    log::info!("Collector stopped after {}", engine.state);
    engine.state.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectorSettings;
    use crate::data::{KlineEvent, ReplayFeed};
    use crate::domain::{Candle, PairInterval};
    use crate::error::CollectorError;
    use crate::models::IndicatorRow;
    use crate::utils::TimeUtils;
    use async_trait::async_trait;
    use chrono::DateTime;

    #[derive(Default)]
    struct CountingPersistence {
        writes: usize,
    }

    impl SeriesPersistence for CountingPersistence {
        fn load_base(&self) -> anyhow::Result<Vec<Candle>> {
            Ok(Vec::new())
        }

        fn save_series(
            &mut self,
            _pair: &PairInterval,
            _rows: &[IndicatorRow],
        ) -> Result<(), CollectorError> {
            self.writes += 1;
            Ok(())
        }
    }

    fn minute(i: i64) -> Candle {
        let ts = DateTime::from_timestamp_millis(i * TimeUtils::MS_IN_MIN + 59_999).unwrap();
        Candle::new(ts, 10.0, 10.5, 9.5, 10.0 + i as f64 * 0.01, 2.0)
    }

    #[tokio::test]
    async fn replay_drains_into_the_engine() {
        let mut engine =
            CollectorEngine::new(CollectorSettings::default(), CountingPersistence::default());
        let mut feed = ReplayFeed::new("BTCEUR", (0..62).map(minute).collect());

        let state = run_until(&mut engine, &mut feed, std::future::pending()).await;

        assert_eq!(state.events_seen, 62);
        // Rows 60, 61 and 62 leave at least 30 clean rows
        assert_eq!(state.published, 3);
        assert_eq!(engine.history().len(), 62);
        assert_eq!(engine.persistence().writes, 3);
    }

    /// Yields a malformed item, then a good one, then never ends.
    struct ScriptedFeed {
        items: Vec<crate::data::FeedItem>,
    }

    #[async_trait]
    impl CandleFeed for ScriptedFeed {
        async fn next_event(&mut self) -> Option<crate::data::FeedItem> {
            if self.items.is_empty() {
                std::future::pending::<()>().await;
            }
            Some(self.items.remove(0))
        }

        fn signature(&self) -> &'static str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn bad_items_do_not_stop_the_loop_and_shutdown_does() {
        let mut engine =
            CollectorEngine::new(CollectorSettings::default(), CountingPersistence::default());
        let mut feed = ScriptedFeed {
            items: vec![
                Err(CollectorError::MalformedEvent("garbage".into())),
                Ok(KlineEvent::closed("BTCEUR", &minute(0))),
            ],
        };
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown = async {
            let _ = stop_rx.await;
        };

        let stopper = async {
            // Let both scripted items through before asking to stop
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            let _ = stop_tx.send(());
        };
        let (state, _) = tokio::join!(run_until(&mut engine, &mut feed, shutdown), stopper);

        assert_eq!(state.events_seen, 2);
        assert_eq!(state.rejected, 1);
        assert_eq!(engine.history().len(), 1);
    }
}
