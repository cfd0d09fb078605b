//! Binance-specific configuration constants and types.

use crate::domain::PairInterval;

/// Configuration for WebSocket Connections
pub struct WsConfig {
    /// WebSocket base URL for Binance streaming API (single stream)
    pub base_url: &'static str,
    /// Maximum reconnection delay (seconds)
    pub max_reconnect_delay_sec: u64,
    /// Initial reconnection delay (seconds)
    pub initial_reconnect_delay_sec: u64,
    /// Capacity of the channel between the socket task and the engine
    pub event_buffer: usize,
}

/// The Master Configuration Struct
pub struct BinanceConfig {
    pub ws: WsConfig,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    ws: WsConfig {
        base_url: "wss://stream.binance.com:9443/ws",
        max_reconnect_delay_sec: 300, // 5 minutes
        initial_reconnect_delay_sec: 1,
        event_buffer: 256,
    },
};

/// Single-stream kline URL, e.g. `.../ws/btceur@kline_1m`.
pub fn kline_stream_url(pair: &PairInterval) -> String {
    format!(
        "{}/{}@kline_{}",
        BINANCE.ws.base_url,
        pair.bn_stream_name(),
        pair.timeframe.label()
    )
}
