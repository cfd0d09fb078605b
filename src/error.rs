use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Per-event failures. None of these stop the collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("malformed kline event: {0}")]
    MalformedEvent(String),

    #[error("out-of-order candle at {candidate}: last stored row is {last}")]
    OutOfOrderAppend {
        last: DateTime<Utc>,
        candidate: DateTime<Utc>,
    },

    #[error("failed to persist series to {}", .path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl CollectorError {
    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        CollectorError::PersistenceFailure {
            path: path.into(),
            source: source.into(),
        }
    }
}
