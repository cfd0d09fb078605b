use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::domain::Candle;

/// The derived columns, in the order they are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IndicatorColumn {
    Rsi,
    #[strum(to_string = "ema12")]
    Ema12,
    #[strum(to_string = "ema26")]
    Ema26,
    #[strum(to_string = "ma7")]
    Ma7,
    #[strum(to_string = "ma25")]
    Ma25,
    Macd,
    Obv,
    Atr,
    BbMa,
    BbStd,
    BbUpper,
    BbLower,
    BbZ,
}

impl IndicatorColumn {
    pub fn all() -> Vec<IndicatorColumn> {
        IndicatorColumn::iter().collect()
    }
}

/// The ground-truth columns. Never imputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceColumn {
    pub fn all() -> Vec<PriceColumn> {
        PriceColumn::iter().collect()
    }
}

/// A candle plus every derived indicator. `None` means missing (cold look-back window,
/// or a hole in the input).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub candle: Candle,
    pub rsi: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub ma7: Option<f64>,
    pub ma25: Option<f64>,
    pub macd: Option<f64>,
    pub obv: Option<f64>,
    pub atr: Option<f64>,
    pub bb_ma: Option<f64>,
    pub bb_std: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_z: Option<f64>,
}

impl IndicatorRow {
    pub fn bare(candle: Candle) -> Self {
        Self {
            candle,
            rsi: None,
            ema12: None,
            ema26: None,
            ma7: None,
            ma25: None,
            macd: None,
            obv: None,
            atr: None,
            bb_ma: None,
            bb_std: None,
            bb_upper: None,
            bb_lower: None,
            bb_z: None,
        }
    }

    pub fn get(&self, column: IndicatorColumn) -> Option<f64> {
        match column {
            IndicatorColumn::Rsi => self.rsi,
            IndicatorColumn::Ema12 => self.ema12,
            IndicatorColumn::Ema26 => self.ema26,
            IndicatorColumn::Ma7 => self.ma7,
            IndicatorColumn::Ma25 => self.ma25,
            IndicatorColumn::Macd => self.macd,
            IndicatorColumn::Obv => self.obv,
            IndicatorColumn::Atr => self.atr,
            IndicatorColumn::BbMa => self.bb_ma,
            IndicatorColumn::BbStd => self.bb_std,
            IndicatorColumn::BbUpper => self.bb_upper,
            IndicatorColumn::BbLower => self.bb_lower,
            IndicatorColumn::BbZ => self.bb_z,
        }
    }

    pub fn set(&mut self, column: IndicatorColumn, value: Option<f64>) {
        let slot = match column {
            IndicatorColumn::Rsi => &mut self.rsi,
            IndicatorColumn::Ema12 => &mut self.ema12,
            IndicatorColumn::Ema26 => &mut self.ema26,
            IndicatorColumn::Ma7 => &mut self.ma7,
            IndicatorColumn::Ma25 => &mut self.ma25,
            IndicatorColumn::Macd => &mut self.macd,
            IndicatorColumn::Obv => &mut self.obv,
            IndicatorColumn::Atr => &mut self.atr,
            IndicatorColumn::BbMa => &mut self.bb_ma,
            IndicatorColumn::BbStd => &mut self.bb_std,
            IndicatorColumn::BbUpper => &mut self.bb_upper,
            IndicatorColumn::BbLower => &mut self.bb_lower,
            IndicatorColumn::BbZ => &mut self.bb_z,
        };
        *slot = value;
    }

    pub fn price(&self, column: PriceColumn) -> f64 {
        match column {
            PriceColumn::Open => self.candle.open,
            PriceColumn::High => self.candle.high,
            PriceColumn::Low => self.candle.low,
            PriceColumn::Close => self.candle.close,
            PriceColumn::Volume => self.candle.volume,
        }
    }
}
