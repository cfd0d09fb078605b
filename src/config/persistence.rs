//! File persistence configuration

use crate::domain::PairInterval;
use crate::utils::TimeUtils;

pub struct PersistenceConfig {
    /// Directory holding every clean series file
    pub directory: &'static str,
    pub filename_suffix: &'static str,
    pub extension: &'static str,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    directory: "data",
    filename_suffix: "clean",
    extension: "csv",
};

/// Generate interval-specific series filename
/// Example: "btc_eur_1m_clean.csv" or "btc_eur_4h_clean.csv"
pub fn series_filename(symbol: &str, interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    let stem = match PairInterval::get_base_and_quote(&symbol.to_uppercase()) {
        Some((base, quote)) => format!("{}_{}", base, quote),
        None => symbol.to_string(),
    };
    format!(
        "{}_{}_{}.{}",
        stem.to_lowercase(),
        interval_str,
        PERSISTENCE.filename_suffix,
        PERSISTENCE.extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_split_base_and_quote() {
        assert_eq!(
            series_filename("BTCEUR", TimeUtils::MS_IN_MIN),
            "btc_eur_1m_clean.csv"
        );
        assert_eq!(
            series_filename("ethusdt", TimeUtils::MS_IN_4_H),
            "eth_usdt_4h_clean.csv"
        );
        assert_eq!(
            series_filename("XYZ", TimeUtils::MS_IN_H),
            "xyz_1h_clean.csv"
        );
    }
}
