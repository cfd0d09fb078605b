use crate::analysis::imputation::{self, CleanSpec};
use crate::analysis::{aggregation, indicators};
use crate::config::CollectorSettings;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_TIMEFRAME_SUMMARY;
use crate::data::{FeedItem, KlineEvent, RollingHistory, SeriesPersistence};
use crate::domain::{PairInterval, Timeframe};
use crate::error::CollectorError;

use itertools::Itertools;

use super::messages::UpdateOutcome;
use super::state::CollectorState;

/// Owns the rolling 1-minute store and drives one full update per closed candle:
/// append, indicators, cleaning, then every timeframe, then persistence.
pub struct CollectorEngine<P: SeriesPersistence> {
    settings: CollectorSettings,
    history: RollingHistory,
    persistence: P,
    pub state: CollectorState,
}

impl<P: SeriesPersistence> CollectorEngine<P> {
    /// Seeds the store from the persisted 1-minute series. An unreadable file is logged and the
    /// store starts empty.
    pub fn new(settings: CollectorSettings, persistence: P) -> Self {
        let seed = match persistence.load_base() {
            Ok(candles) => candles,
            Err(e) => {
                log::warn!("Could not load persisted 1m series, starting empty: {:#}", e);
                Vec::new()
            }
        };
        let history = RollingHistory::from_candles(settings.window_capacity, seed);
        log::info!(
            "Collector ready for {}: {} rows loaded (capacity {}), timeframes [{}]",
            settings.symbol,
            history.len(),
            settings.window_capacity,
            settings
                .timeframes
                .iter()
                .map(Timeframe::label)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            settings,
            history,
            persistence,
            state: CollectorState::new(),
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    pub fn history(&self) -> &RollingHistory {
        &self.history
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Entry point for the event loop: decode failures from the feed count as rejections.
    pub fn handle_item(&mut self, item: FeedItem) -> UpdateOutcome {
        let outcome = match item {
            Ok(event) => self.apply_event(&event),
            Err(e) => UpdateOutcome::Rejected(e),
        };
        self.log_outcome(&outcome);
        self.state.record(&outcome);
        outcome
    }

    pub fn handle_event(&mut self, event: &KlineEvent) -> UpdateOutcome {
        self.handle_item(Ok(event.clone()))
    }

    fn apply_event(&mut self, event: &KlineEvent) -> UpdateOutcome {
        let is_closed = match event.is_closed {
            Some(flag) => flag,
            None => {
                return UpdateOutcome::Rejected(CollectorError::MalformedEvent(
                    "missing closed flag".into(),
                ));
            }
        };
        if !is_closed || !event.is_for(&self.settings.symbol) || !event.is_base_interval() {
            return UpdateOutcome::Ignored;
        }

        let candle = match event.to_candle() {
            Ok(candle) => candle,
            Err(e) => return UpdateOutcome::Rejected(e),
        };
        if let Err(e) = self.history.append(candle) {
            return UpdateOutcome::Rejected(e);
        }
        self.publish()
    }

    /// Recompute everything from the current store and write what is ready.
    pub fn publish(&mut self) -> UpdateOutcome {
        let rows = self.history.len();
        if rows < self.settings.warmup_rows {
            return UpdateOutcome::Waiting { rows };
        }

        let snapshot = self.history.snapshot();
        let with_indicators = indicators::compute(&snapshot);
        let spec = CleanSpec::all_columns(self.settings.skip_rows, self.settings.base_min_rows);
        let Some(clean_base) = imputation::clean(&with_indicators, &spec) else {
            return UpdateOutcome::InsufficientData { rows };
        };

        let base_pair = PairInterval::new(&self.settings.symbol, Timeframe::ONE_MINUTE);
        if let Err(e) = self.persistence.save_series(&base_pair, &clean_base) {
            return UpdateOutcome::BaseWriteFailed(e);
        }

        // Every timeframe reads the same immutable clean snapshot
        let aggregates = aggregation::aggregate_all(&clean_base, &self.settings);

        let mut timeframes_written = 0;
        let mut timeframes_skipped = 0;
        let mut failed_writes = 0;
        for (timeframe, result) in aggregates {
            let Some(series) = result else {
                timeframes_skipped += 1;
                #[cfg(debug_assertions)]
                if PRINT_TIMEFRAME_SUMMARY {
                    log::info!("[{}] not enough bars yet, previous file kept", timeframe);
                }
                continue;
            };

            #[cfg(debug_assertions)]
            if PRINT_TIMEFRAME_SUMMARY {
                log::info!("[{}] {} clean rows", timeframe, series.len());
            }

            let pair = PairInterval::new(&self.settings.symbol, timeframe);
            match self.persistence.save_series(&pair, &series) {
                Ok(()) => timeframes_written += 1,
                Err(e) => {
                    log::error!("{}: {:#}", pair, anyhow::Error::from(e));
                    failed_writes += 1;
                }
            }
        }

        if let Some(last) = clean_base.last() {
            self.state
                .mark_published(last.candle.timestamp, last.candle.close);
        }

        UpdateOutcome::Published {
            base_rows: clean_base.len(),
            timeframes_written,
            timeframes_skipped,
            failed_writes,
        }
    }

    fn log_outcome(&self, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::Rejected(e) => log::warn!("Dropped event: {}", e),
            UpdateOutcome::BaseWriteFailed(e) => log::error!(
                "1m series not saved, timeframes left as they were: {}",
                anyhow::Chain::new(e).join(": ")
            ),
            UpdateOutcome::Published { base_rows, .. } => {
                if let (Some(at), Some(close)) =
                    (self.state.last_published_at, self.state.last_close)
                {
                    log::info!(
                        "✅ {} clean 1m rows. Last close: {:.2}, time: {}",
                        base_rows,
                        close,
                        at
                    );
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CsvSeriesStore;
    use crate::domain::Candle;
    use crate::models::IndicatorRow;
    use crate::utils::TimeUtils;
    use chrono::DateTime;
    use std::collections::HashMap;

    /// Keeps saved series in memory; can be told to fail every write or only 1m writes.
    #[derive(Default)]
    struct MemoryPersistence {
        base: Vec<Candle>,
        saved: HashMap<Timeframe, Vec<IndicatorRow>>,
        writes: usize,
        fail_writes: bool,
        fail_base_writes: bool,
    }

    impl SeriesPersistence for MemoryPersistence {
        fn load_base(&self) -> anyhow::Result<Vec<Candle>> {
            Ok(self.base.clone())
        }

        fn save_series(
            &mut self,
            pair: &PairInterval,
            rows: &[IndicatorRow],
        ) -> Result<(), CollectorError> {
            self.writes += 1;
            if self.fail_writes || (self.fail_base_writes && pair.timeframe == Timeframe::ONE_MINUTE)
            {
                return Err(CollectorError::persistence(
                    "/unavailable",
                    std::io::Error::other("disk gone"),
                ));
            }
            self.saved.insert(pair.timeframe, rows.to_vec());
            Ok(())
        }
    }

    // Close time of minute `i`, as Binance reports it
    fn candle(i: usize, close: f64) -> Candle {
        let ts =
            DateTime::from_timestamp_millis(i as i64 * TimeUtils::MS_IN_MIN + 59_999).unwrap();
        Candle::new(ts, close, close + 0.05, close - 0.05, close, 1.0)
    }

    fn event(i: usize, close: f64) -> KlineEvent {
        KlineEvent::closed("BTCEUR", &candle(i, close))
    }

    #[test]
    fn forty_rising_candles_publish_a_saturated_rsi_series() {
        let settings = CollectorSettings {
            base_min_rows: 10,
            ..CollectorSettings::default()
        };
        let mut engine = CollectorEngine::new(settings, MemoryPersistence::default());

        for i in 0..29 {
            let outcome = engine.handle_event(&event(i, 10.0 + 0.1 * i as f64));
            assert!(matches!(outcome, UpdateOutcome::Waiting { .. }));
        }
        for i in 29..39 {
            let outcome = engine.handle_event(&event(i, 10.0 + 0.1 * i as f64));
            assert!(matches!(outcome, UpdateOutcome::InsufficientData { .. }));
        }
        let outcome = engine.handle_event(&event(39, 10.0 + 0.1 * 39.0));
        match outcome {
            UpdateOutcome::Published {
                base_rows,
                timeframes_written,
                timeframes_skipped,
                failed_writes,
            } => {
                assert_eq!(base_rows, 10);
                // 40 minutes is nowhere near enough bars for any timeframe
                assert_eq!(timeframes_written, 0);
                assert_eq!(timeframes_skipped, 5);
                assert_eq!(failed_writes, 0);
            }
            other => panic!("expected a publish, got {:?}", other),
        }

        let base = &engine.persistence().saved[&Timeframe::ONE_MINUTE];
        assert_eq!(base.len(), 10);
        for row in base {
            assert!((row.rsi.unwrap() - 100.0).abs() < 1e-4);
        }
        assert!(base[9].bb_z.unwrap() > 0.0);
        assert_eq!(engine.state.published, 1);
        assert_eq!(engine.state.last_close, Some(10.0 + 0.1 * 39.0));
    }

    #[test]
    fn default_thresholds_need_more_than_forty_candles() {
        let mut engine =
            CollectorEngine::new(CollectorSettings::default(), MemoryPersistence::default());
        let mut last = UpdateOutcome::Ignored;
        for i in 0..40 {
            last = engine.handle_event(&event(i, 10.0 + 0.1 * i as f64));
        }
        assert!(matches!(last, UpdateOutcome::InsufficientData { rows: 40 }));
        assert_eq!(engine.persistence().writes, 0);
    }

    #[test]
    fn events_that_are_not_ours_are_ignored_or_rejected() {
        let mut engine =
            CollectorEngine::new(CollectorSettings::default(), MemoryPersistence::default());
        engine.handle_event(&event(5, 10.0));

        let mut forming = event(6, 10.0);
        forming.is_closed = Some(false);
        assert!(matches!(engine.handle_event(&forming), UpdateOutcome::Ignored));

        let other_symbol = KlineEvent::closed("ETHUSDT", &candle(6, 10.0));
        assert!(matches!(engine.handle_event(&other_symbol), UpdateOutcome::Ignored));

        let mut other_interval = event(6, 10.0);
        other_interval.interval = Some("5m".into());
        assert!(matches!(engine.handle_event(&other_interval), UpdateOutcome::Ignored));

        let mut malformed = event(6, 10.0);
        malformed.close = None;
        assert!(matches!(
            engine.handle_event(&malformed),
            UpdateOutcome::Rejected(CollectorError::MalformedEvent(_))
        ));

        let mut no_flag = event(6, 10.0);
        no_flag.is_closed = None;
        assert!(matches!(
            engine.handle_event(&no_flag),
            UpdateOutcome::Rejected(CollectorError::MalformedEvent(_))
        ));

        let before = engine.history().snapshot();
        assert!(matches!(
            engine.handle_event(&event(3, 10.0)),
            UpdateOutcome::Rejected(CollectorError::OutOfOrderAppend { .. })
        ));
        assert_eq!(engine.history().snapshot(), before);
        assert_eq!(engine.state.rejected, 3);

        // The stream carries on after rejections
        assert!(matches!(
            engine.handle_event(&event(6, 10.0)),
            UpdateOutcome::Waiting { rows: 2 }
        ));
    }

    #[test]
    fn seeded_history_publishes_the_timeframes_with_enough_bars() {
        let persistence = MemoryPersistence {
            base: (0..1000)
                .map(|i| candle(i, 100.0 + ((i * 7) % 13) as f64))
                .collect(),
            ..MemoryPersistence::default()
        };
        let mut engine = CollectorEngine::new(CollectorSettings::default(), persistence);
        assert_eq!(engine.history().len(), 1000);

        let outcome = engine.handle_event(&event(1000, 101.0));
        match outcome {
            UpdateOutcome::Published {
                base_rows,
                timeframes_written,
                timeframes_skipped,
                ..
            } => {
                assert_eq!(base_rows, 971);
                // 5m and 15m have enough bars; 30m, 1h and 4h do not
                assert_eq!(timeframes_written, 2);
                assert_eq!(timeframes_skipped, 3);
            }
            other => panic!("expected a publish, got {:?}", other),
        }
        let five: Timeframe = "5m".parse().unwrap();
        let hour: Timeframe = "1h".parse().unwrap();
        assert_eq!(engine.persistence().saved[&five].len(), 165);
        assert!(!engine.persistence().saved.contains_key(&hour));
    }

    #[test]
    fn write_failures_are_counted_and_the_loop_continues() {
        let persistence = MemoryPersistence {
            base: (0..60).map(|i| candle(i, 50.0 + i as f64)).collect(),
            fail_writes: true,
            ..MemoryPersistence::default()
        };
        let mut engine = CollectorEngine::new(CollectorSettings::default(), persistence);

        for i in 60..62 {
            let outcome = engine.handle_event(&event(i, 50.0 + i as f64));
            assert!(matches!(
                outcome,
                UpdateOutcome::BaseWriteFailed(CollectorError::PersistenceFailure { .. })
            ));
        }
        assert_eq!(engine.history().len(), 62);
        assert_eq!(engine.state.failed_writes, 2);
        assert_eq!(engine.state.published, 0);
        assert_eq!(engine.state.last_close, None);
    }

    #[test]
    fn failed_base_write_leaves_every_timeframe_unwritten() {
        let persistence = MemoryPersistence {
            base: (0..1000)
                .map(|i| candle(i, 100.0 + ((i * 7) % 13) as f64))
                .collect(),
            fail_base_writes: true,
            ..MemoryPersistence::default()
        };
        let mut engine = CollectorEngine::new(CollectorSettings::default(), persistence);

        let outcome = engine.handle_event(&event(1000, 101.0));
        assert!(matches!(outcome, UpdateOutcome::BaseWriteFailed(_)));
        // Only the 1m write was attempted; 5m and 15m would otherwise have been written
        assert_eq!(engine.persistence().writes, 1);
        assert!(engine.persistence().saved.is_empty());
        assert_eq!(engine.state.published, 0);
        assert_eq!(engine.state.last_published_at, None);

        // The next candle is still processed once the disk recovers
        engine.persistence.fail_base_writes = false;
        let outcome = engine.handle_event(&event(1001, 102.0));
        match outcome {
            UpdateOutcome::Published {
                timeframes_written,
                failed_writes,
                ..
            } => {
                assert_eq!(timeframes_written, 2);
                assert_eq!(failed_writes, 0);
            }
            other => panic!("expected a publish, got {:?}", other),
        }
        assert_eq!(engine.state.published, 1);
        assert_eq!(engine.state.failed_writes, 1);
    }

    #[test]
    fn skipped_timeframe_leaves_its_previous_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let store = CsvSeriesStore::new(&dir, "BTCEUR");
        let five_path = store.path_for("5m".parse().unwrap());
        std::fs::write(&five_path, "previous contents\n").unwrap();

        let settings = CollectorSettings {
            base_min_rows: 10,
            data_dir: dir.clone(),
            ..CollectorSettings::default()
        };
        let mut engine = CollectorEngine::new(settings, store);
        for i in 0..40 {
            engine.handle_event(&event(i, 10.0 + 0.1 * i as f64));
        }

        assert!(engine.persistence().path_for(Timeframe::ONE_MINUTE).exists());
        assert_eq!(
            std::fs::read_to_string(&five_path).unwrap(),
            "previous contents\n"
        );
    }
}
