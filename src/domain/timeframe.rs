use std::fmt;
use std::str::FromStr;

use crate::utils::TimeUtils;

/// A bar period we know how to label and bucket into. Only periods with a Binance-style
/// shorthand are representable, so every timeframe has a stable filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timeframe {
    interval_ms: i64,
}

impl Timeframe {
    pub const ONE_MINUTE: Timeframe = Timeframe {
        interval_ms: TimeUtils::MS_IN_MIN,
    };

    pub fn from_ms(interval_ms: i64) -> Option<Self> {
        (interval_ms > 0 && TimeUtils::interval_to_string(interval_ms) != "unknown")
            .then_some(Self { interval_ms })
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn label(&self) -> &'static str {
        TimeUtils::interval_to_string(self.interval_ms)
    }

    /// Start of the epoch-aligned bucket containing `timestamp_ms`.
    /// `div_euclid` keeps pre-1970 instants in the bucket below them.
    pub fn bucket_start_ms(&self, timestamp_ms: i64) -> i64 {
        timestamp_ms.div_euclid(self.interval_ms) * self.interval_ms
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUtils::interval_from_string(s)
            .and_then(Timeframe::from_ms)
            .ok_or_else(|| format!("unsupported timeframe '{}'", s))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
