//! Binance kline stream payloads.
//!
//! Single-stream messages look like `{"e":"kline","s":"BTCEUR","k":{...}}`; combined streams wrap
//! the same object as `{"stream":"btceur@kline_1m","data":{...}}`. Only the inner `k` object is
//! kept.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Candle;
use crate::error::CollectorError;
use crate::utils::maths_utils::finite;
use crate::utils::time_utils::epoch_ms_to_utc;

/// Binance sends prices as decimal strings; recorded or hand-built events may carry floats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberCell {
    Number(f64),
    Text(String),
}

impl NumberCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumberCell::Number(v) => finite(*v),
            NumberCell::Text(s) => s.trim().parse::<f64>().ok().and_then(finite),
        }
    }
}

/// One kline update. Every field is optional at this level so that a missing field surfaces as
/// a `MalformedEvent` from `to_candle` rather than as an opaque decode failure.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    #[serde(rename = "i", default)]
    pub interval: Option<String>,
    /// Kline close time, epoch milliseconds
    #[serde(rename = "T", default)]
    pub close_time_ms: Option<i64>,
    #[serde(rename = "o", default)]
    pub open: Option<NumberCell>,
    #[serde(rename = "h", default)]
    pub high: Option<NumberCell>,
    #[serde(rename = "l", default)]
    pub low: Option<NumberCell>,
    #[serde(rename = "c", default)]
    pub close: Option<NumberCell>,
    #[serde(rename = "v", default)]
    pub volume: Option<NumberCell>,
    #[serde(rename = "x", default)]
    pub is_closed: Option<bool>,
}

impl KlineEvent {
    /// A closed 1-minute event carrying an already-known candle (used by replay).
    pub fn closed(symbol: &str, candle: &Candle) -> Self {
        let cell = |v: f64| finite(v).map(NumberCell::Number);
        Self {
            symbol: Some(symbol.to_uppercase()),
            interval: Some("1m".to_string()),
            close_time_ms: Some(candle.timestamp_ms()),
            open: cell(candle.open),
            high: cell(candle.high),
            low: cell(candle.low),
            close: cell(candle.close),
            volume: cell(candle.volume),
            is_closed: Some(true),
        }
    }

    /// Events without a symbol are taken to belong to the stream they arrived on.
    pub fn is_for(&self, symbol: &str) -> bool {
        self.symbol
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case(symbol))
    }

    pub fn is_base_interval(&self) -> bool {
        self.interval.as_deref().is_none_or(|i| i == "1m")
    }

    /// Parse the numeric payload. Any missing or unparseable field rejects the whole event.
    pub fn to_candle(&self) -> Result<Candle, CollectorError> {
        let timestamp = self
            .close_time_ms
            .and_then(epoch_ms_to_utc)
            .ok_or_else(|| CollectorError::MalformedEvent("missing or invalid close time".into()))?;

        Ok(Candle::new(
            timestamp,
            required(&self.open, "open")?,
            required(&self.high, "high")?,
            required(&self.low, "low")?,
            required(&self.close, "close")?,
            required(&self.volume, "volume")?,
        ))
    }
}

fn required(cell: &Option<NumberCell>, name: &str) -> Result<f64, CollectorError> {
    cell.as_ref()
        .and_then(NumberCell::value)
        .ok_or_else(|| CollectorError::MalformedEvent(format!("missing or unparseable {}", name)))
}

/// `Ok(None)` for anything that is not a kline message (subscription acks, other event types).
pub fn decode_message(text: &str) -> Result<Option<KlineEvent>, CollectorError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CollectorError::MalformedEvent(format!("invalid JSON: {}", e)))?;
    let payload = value.get("data").unwrap_or(&value);

    if let Some(event_type) = payload.get("e").and_then(Value::as_str) {
        if event_type != "kline" {
            return Ok(None);
        }
    }
    let Some(kline) = payload.get("k") else {
        return Ok(None);
    };

    KlineEvent::deserialize(kline)
        .map(Some)
        .map_err(|e| CollectorError::MalformedEvent(format!("bad kline object: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSED: &str = r#"{"e":"kline","E":1704110460005,"s":"BTCEUR","k":{"t":1704110400000,
        "T":1704110459999,"s":"BTCEUR","i":"1m","f":1,"L":2,"o":"39000.10","c":"39010.00",
        "h":"39020.50","l":"38990.00","v":"1.25","n":12,"x":true,"q":"0","V":"0","Q":"0","B":"0"}}"#;

    #[test]
    fn decodes_a_closed_kline() {
        let event = decode_message(CLOSED).unwrap().unwrap();
        assert_eq!(event.is_closed, Some(true));
        assert!(event.is_for("btceur"));
        assert!(event.is_base_interval());

        let candle = event.to_candle().unwrap();
        assert_eq!(candle.timestamp_ms(), 1_704_110_459_999);
        assert_eq!(candle.open, 39000.10);
        assert_eq!(candle.high, 39020.50);
        assert_eq!(candle.low, 38990.00);
        assert_eq!(candle.close, 39010.00);
        assert_eq!(candle.volume, 1.25);
    }

    #[test]
    fn combined_stream_wrapper_is_unwrapped() {
        let wrapped = format!(r#"{{"stream":"btceur@kline_1m","data":{}}}"#, CLOSED);
        let event = decode_message(&wrapped).unwrap().unwrap();
        assert_eq!(event.symbol.as_deref(), Some("BTCEUR"));
    }

    #[test]
    fn non_kline_messages_are_skipped() {
        assert_eq!(decode_message(r#"{"result":null,"id":1}"#).unwrap(), None);
        assert_eq!(
            decode_message(r#"{"e":"24hrMiniTicker","s":"BTCEUR","c":"1"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn bad_numbers_and_missing_fields_are_malformed() {
        assert!(matches!(
            decode_message("not json"),
            Err(CollectorError::MalformedEvent(_))
        ));

        let bad_price = r#"{"e":"kline","k":{"T":1,"o":"abc","h":"1","l":"1","c":"1","v":"1","x":true}}"#;
        let event = decode_message(bad_price).unwrap().unwrap();
        assert!(matches!(
            event.to_candle(),
            Err(CollectorError::MalformedEvent(_))
        ));

        let no_time = r#"{"e":"kline","k":{"o":"1","h":"1","l":"1","c":"1","v":"1","x":true}}"#;
        let event = decode_message(no_time).unwrap().unwrap();
        assert!(event.to_candle().is_err());
    }

    #[test]
    fn floats_are_accepted_as_well_as_strings() {
        let text = r#"{"k":{"T":60000,"o":1.5,"h":2,"l":1,"c":"1.75","v":3,"x":false}}"#;
        let event = decode_message(text).unwrap().unwrap();
        assert_eq!(event.is_closed, Some(false));
        assert_eq!(event.to_candle().unwrap().high, 2.0);
    }

    #[test]
    fn replayed_candles_round_trip_through_events() {
        let candle = decode_message(CLOSED)
            .unwrap()
            .unwrap()
            .to_candle()
            .unwrap();
        let event = KlineEvent::closed("btceur", &candle);
        assert!(event.is_for("BTCEUR"));
        assert_eq!(event.to_candle().unwrap(), candle);
    }
}
