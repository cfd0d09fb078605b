use crate::domain::Timeframe;

/// A trading pair at one resolution, e.g. BTCEUR at 5m. Identifies one persisted series.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub timeframe: Timeframe,
}

impl PairInterval {
    pub fn new(name: &str, timeframe: Timeframe) -> Self {
        Self {
            name: name.to_uppercase(),
            timeframe,
        }
    }

    pub fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        // `strip_suffix` also fails when the whole name is just the quote.
        text.strip_suffix(quote).filter(|base| !base.is_empty())
    }

    // Finds the trading quote at the end of the pair name and returns it.
    // Returns None if no matching quote is found.
    pub fn get_quote(text: &str) -> Option<&str> {
        static PAIR_QUOTES: &[&str] = &["USDT", "USDC", "FDUSD", "EUR", "BTC", "ETH"];
        PAIR_QUOTES
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    pub fn get_base_and_quote(text: &str) -> Option<(&str, &str)> {
        let base = Self::get_base(text)?;
        let quote = Self::get_quote(text)?;
        Some((base, quote))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Stream names are lower case on Binance
    pub fn bn_stream_name(&self) -> String {
        self.name.to_lowercase()
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.timeframe)
    }
}
