//! Pipeline sizing: rolling window, imputation thresholds, and the timeframes we republish.

use crate::utils::TimeUtils;

/// Settings for the Imputation Stage
pub struct ImputationSettings {
    /// Leading rows dropped before cleaning (their look-back windows are cold)
    pub skip_rows: usize,
    /// Minimum clean 1-minute rows before anything is written
    pub base_min_rows: usize,
    /// Minimum clean rows per aggregated timeframe
    pub timeframe_min_rows: usize,
}

/// The Master Collector Configuration
pub struct CollectorConfig {
    /// Symbol streamed when none is given on the command line
    pub default_symbol: &'static str,
    /// Resolution of the incoming candles. Fixed.
    pub base_interval_ms: i64,
    /// Maximum rows retained, applied separately to the 1m series and each timeframe
    pub window_capacity: usize,
    /// Rows the store must hold before indicators are attempted at all
    pub warmup_rows: usize,
    pub default_timeframes_ms: &'static [i64],

    // Sub-groups
    pub imputation: ImputationSettings,
}

pub const COLLECTOR: CollectorConfig = CollectorConfig {
    default_symbol: "BTCEUR",
    base_interval_ms: TimeUtils::MS_IN_MIN,
    window_capacity: 7770,
    warmup_rows: 30,
    default_timeframes_ms: &[
        TimeUtils::MS_IN_5_MIN,
        TimeUtils::MS_IN_15_MIN,
        TimeUtils::MS_IN_30_MIN,
        TimeUtils::MS_IN_H,
        TimeUtils::MS_IN_4_H,
    ],

    imputation: ImputationSettings {
        skip_rows: 30,
        base_min_rows: 30,
        timeframe_min_rows: 10,
    },
};
