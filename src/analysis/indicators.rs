//! Indicator Engine: derives every indicator column from an ordered OHLCV series.
//!
//! Recomputed from scratch on each call. Windows count rows, not minutes, so gaps in the
//! feed just make a window span more wall-clock time.

use crate::config::{INDICATORS, IndicatorConfig};
use crate::domain::Candle;
use crate::models::IndicatorRow;
use crate::utils::maths_utils::{finite, rolling_mean, rolling_population_std};

/// Indicators with the standard periods.
pub fn compute(series: &[Candle]) -> Vec<IndicatorRow> {
    compute_with(series, &INDICATORS)
}

pub fn compute_with(series: &[Candle], cfg: &IndicatorConfig) -> Vec<IndicatorRow> {
    let closes: Vec<Option<f64>> = series.iter().map(Candle::close_cell).collect();

    let rsi = relative_strength_index(&closes, cfg.rsi_period, cfg.epsilon);
    let ema_fast = exponential_moving_average(&closes, cfg.ema_fast_span);
    let ema_slow = exponential_moving_average(&closes, cfg.ema_slow_span);
    let ma_short = rolling_mean(&closes, cfg.ma_short_period);
    let ma_long = rolling_mean(&closes, cfg.ma_long_period);
    let obv = on_balance_volume(series);
    let atr = rolling_mean(&true_range(series), cfg.atr_period);
    let bb_ma = rolling_mean(&closes, cfg.bollinger_period);
    let bb_std = rolling_population_std(&closes, cfg.bollinger_period);

    series
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let mut row = IndicatorRow::bare(*candle);
            row.rsi = rsi[i];
            row.ema12 = ema_fast[i];
            row.ema26 = ema_slow[i];
            row.ma7 = ma_short[i];
            row.ma25 = ma_long[i];
            row.macd = zip_with(ema_fast[i], ema_slow[i], |fast, slow| fast - slow);
            row.obv = obv[i];
            row.atr = atr[i];
            row.bb_ma = bb_ma[i];
            row.bb_std = bb_std[i];
            row.bb_upper = zip_with(bb_ma[i], bb_std[i], |ma, std| ma + cfg.bollinger_k * std);
            row.bb_lower = zip_with(bb_ma[i], bb_std[i], |ma, std| ma - cfg.bollinger_k * std);
            row.bb_z = match (candle.close_cell(), bb_ma[i], bb_std[i]) {
                (Some(close), Some(ma), Some(std)) => finite((close - ma) / (std + cfg.epsilon)),
                _ => None,
            };
            row
        })
        .collect()
}

fn zip_with(a: Option<f64>, b: Option<f64>, f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => finite(f(a, b)),
        _ => None,
    }
}

/// Simple-average RSI (not Wilder smoothing). The delta series starts at row 1, so the
/// first defined value sits at row `period`.
fn relative_strength_index(closes: &[Option<f64>], period: usize, epsilon: f64) -> Vec<Option<f64>> {
    let deltas: Vec<Option<f64>> = (0..closes.len())
        .map(|i| match i {
            0 => None,
            _ => zip_with(closes[i], closes[i - 1], |curr, prev| curr - prev),
        })
        .collect();
    let ups: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let downs: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let roll_up = rolling_mean(&ups, period);
    let roll_down = rolling_mean(&downs, period);

    roll_up
        .into_iter()
        .zip(roll_down)
        .map(|(up, down)| {
            zip_with(up, down, |up, down| {
                let rs = up / (down + epsilon);
                100.0 - 100.0 / (1.0 + rs)
            })
        })
        .collect()
}

/// EMA seeded with the first close (no warm-up gap). A missing close carries the
/// previous value forward.
fn exponential_moving_average(closes: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    closes
        .iter()
        .map(|close| {
            prev = match (*close, prev) {
                (Some(c), None) => Some(c),
                (Some(c), Some(p)) => Some(alpha * c + (1.0 - alpha) * p),
                (None, p) => p,
            };
            prev
        })
        .collect()
}

/// Running volume total over the given rows, restarting at 0 on row 0. The whole fold is
/// redone on every call, so eviction simply re-seeds it from the oldest retained row.
fn on_balance_volume(series: &[Candle]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    series
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            if i > 0 && candle.volume.is_finite() {
                let prev_close = series[i - 1].close;
                if candle.close > prev_close {
                    total += candle.volume;
                } else if candle.close < prev_close {
                    total -= candle.volume;
                }
            }
            Some(total)
        })
        .collect()
}

fn true_range(series: &[Candle]) -> Vec<Option<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let high_low = candle.high - candle.low;
            let range = match i {
                0 => high_low,
                _ => {
                    let prev_close = series[i - 1].close;
                    // f64::max skips a NaN operand, so a missing previous close falls back to high-low
                    high_low
                        .max((candle.high - prev_close).abs())
                        .max((candle.low - prev_close).abs())
                }
            };
            finite(range)
        })
        .collect()
}
