//! Indicator periods. Changing any of these changes every persisted column.

pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_fast_span: usize,
    pub ema_slow_span: usize,
    pub ma_short_period: usize,
    pub ma_long_period: usize,
    pub atr_period: usize,
    pub bollinger_period: usize,
    /// Band width in standard deviations
    pub bollinger_k: f64,
    /// Added to denominators that can reach zero (flat markets)
    pub epsilon: f64,
}

pub const INDICATORS: IndicatorConfig = IndicatorConfig {
    rsi_period: 14,
    ema_fast_span: 12,
    ema_slow_span: 26,
    ma_short_period: 7,
    ma_long_period: 25,
    atr_period: 14,
    bollinger_period: 20,
    bollinger_k: 2.0,
    epsilon: 1e-9,
};
