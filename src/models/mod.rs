// Row types shared by the analysis pipeline and persistence

pub mod indicator_row;

pub use indicator_row::{IndicatorColumn, IndicatorRow, PriceColumn};
