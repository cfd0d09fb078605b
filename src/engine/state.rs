use chrono::{DateTime, Utc};

use super::messages::UpdateOutcome;

/// Running tally of what the engine has done since start-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectorState {
    pub events_seen: u64,
    pub ignored: u64,
    pub rejected: u64,
    pub published: u64,
    pub failed_writes: u64,

    /// Timestamp and close of the newest row in the last published series
    pub last_published_at: Option<DateTime<Utc>>,
    pub last_close: Option<f64>,

    /// Last rejection or 1m write failure, repeated in the shutdown summary
    pub last_error: Option<String>,
}

impl CollectorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &UpdateOutcome) {
        self.events_seen += 1;
        match outcome {
            UpdateOutcome::Ignored => self.ignored += 1,
            UpdateOutcome::Rejected(e) => {
                self.rejected += 1;
                self.last_error = Some(e.to_string());
            }
            UpdateOutcome::BaseWriteFailed(e) => {
                self.failed_writes += 1;
                self.last_error = Some(e.to_string());
            }
            UpdateOutcome::Published { failed_writes, .. } => {
                self.published += 1;
                self.failed_writes += *failed_writes as u64;
            }
            UpdateOutcome::Waiting { .. } | UpdateOutcome::InsufficientData { .. } => {}
        }
    }

    pub fn mark_published(&mut self, at: DateTime<Utc>, close: f64) {
        self.last_published_at = Some(at);
        self.last_close = Some(close);
    }
}

impl std::fmt::Display for CollectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} events: {} published, {} ignored, {} rejected, {} failed writes",
            self.events_seen, self.published, self.ignored, self.rejected, self.failed_writes
        )?;
        if let Some(error) = &self.last_error {
            write!(f, " (last error: {})", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectorError;

    #[test]
    fn tallies_outcomes() {
        let mut state = CollectorState::new();
        state.record(&UpdateOutcome::Ignored);
        state.record(&UpdateOutcome::Waiting { rows: 3 });
        state.record(&UpdateOutcome::Rejected(CollectorError::MalformedEvent("x".into())));
        state.record(&UpdateOutcome::Published {
            base_rows: 10,
            timeframes_written: 1,
            timeframes_skipped: 4,
            failed_writes: 2,
        });

        assert_eq!(state.events_seen, 4);
        assert_eq!(state.ignored, 1);
        assert_eq!(state.rejected, 1);
        assert_eq!(state.published, 1);
        assert_eq!(state.failed_writes, 2);
        assert_eq!(state.last_error.as_deref(), Some("malformed kline event: x"));
        assert_eq!(
            state.to_string(),
            "4 events: 1 published, 1 ignored, 1 rejected, 2 failed writes \
             (last error: malformed kline event: x)"
        );
    }

    #[test]
    fn base_write_failure_is_a_failed_write_not_a_publish() {
        let mut state = CollectorState::new();
        state.record(&UpdateOutcome::BaseWriteFailed(CollectorError::persistence(
            "/data/btc_eur_1m_clean.csv",
            std::io::Error::other("disk full"),
        )));

        assert_eq!(state.published, 0);
        assert_eq!(state.failed_writes, 1);
        assert_eq!(
            state.last_error.as_deref(),
            Some("failed to persist series to /data/btc_eur_1m_clean.csv")
        );
        assert_eq!(
            CollectorState::new().to_string(),
            "0 events: 0 published, 0 ignored, 0 rejected, 0 failed writes"
        );
    }
}
