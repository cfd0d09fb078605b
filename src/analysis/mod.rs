// Indicator derivation, cleaning and multi-timeframe aggregation
pub mod aggregation;
pub mod imputation;
pub mod indicators;

// Re-export commonly used types
pub use aggregation::{aggregate, aggregate_all, resample};
pub use imputation::{CleanSpec, clean};
