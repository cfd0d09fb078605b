use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::config::{BINANCE, kline_stream_url};
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_STREAM_PAYLOADS;
use crate::data::kline_event::{KlineEvent, decode_message};
use crate::domain::{PairInterval, Timeframe};
use crate::error::CollectorError;

/// A decoded kline, or the reason a message could not be decoded.
pub type FeedItem = Result<KlineEvent, CollectorError>;

/// Source of kline events for the engine. Push-based: one item per received message.
#[async_trait]
pub trait CandleFeed: Send {
    /// `None` once the feed has nothing more to deliver.
    async fn next_event(&mut self) -> Option<FeedItem>;

    /// A short name for logs, so we know which feed we ran with.
    fn signature(&self) -> &'static str;
}

/// Live 1-minute klines for one symbol from the Binance websocket.
/// Reconnects forever in a background task; dropping the feed stops it.
pub struct BinanceKlineFeed {
    receiver: mpsc::Receiver<FeedItem>,
    task: JoinHandle<()>,
}

impl BinanceKlineFeed {
    /// Must be called from inside a tokio runtime.
    pub fn connect(symbol: &str) -> Self {
        let url = kline_stream_url(&PairInterval::new(symbol, Timeframe::ONE_MINUTE));
        let (sender, receiver) = mpsc::channel(BINANCE.ws.event_buffer);

        log::info!(">>> KlineStream: Subscribing to {}", url);
        let task = tokio::spawn(run_kline_stream_with_reconnect(url, sender));
        Self { receiver, task }
    }
}

impl Drop for BinanceKlineFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl CandleFeed for BinanceKlineFeed {
    async fn next_event(&mut self) -> Option<FeedItem> {
        self.receiver.recv().await
    }

    fn signature(&self) -> &'static str {
        "Binance WS"
    }
}

/// Wrapper that handles reconnection logic with exponential backoff
async fn run_kline_stream_with_reconnect(url: String, sender: mpsc::Sender<FeedItem>) {
    let mut reconnect_delay = BINANCE.ws.initial_reconnect_delay_sec;

    loop {
        match run_kline_stream(&url, &sender).await {
            Ok(_) => {
                // Connection closed normally (24-hour timeout or server close)
                log::info!("Kline stream closed, reconnecting...");
                reconnect_delay = BINANCE.ws.initial_reconnect_delay_sec;
            }
            Err(e) => {
                log::error!("Kline stream error: {}", e);
                log::info!("Reconnecting kline stream in {} seconds...", reconnect_delay);
                tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;

                // Increase delay for next attempt (capped at max)
                reconnect_delay = (reconnect_delay * 2).min(BINANCE.ws.max_reconnect_delay_sec);
            }
        }

        // Nobody listening any more
        if sender.is_closed() {
            return;
        }

        // Small delay before reconnecting even on normal close
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn run_kline_stream(
    url: &str,
    sender: &mpsc::Sender<FeedItem>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (ws_stream, _) = connect_async(url).await?;
    log::info!("✓ Connected to kline stream {}", url);

    let (_write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                #[cfg(debug_assertions)]
                if PRINT_STREAM_PAYLOADS {
                    log::info!("[kline-stream] raw payload: {}", text.as_str());
                }

                let item = match decode_message(text.as_str()) {
                    Ok(Some(event)) => Ok(event),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                };
                if sender.send(item).await.is_err() {
                    // Receiver dropped: the collector is shutting down
                    return Ok(());
                }
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // WebSocket keepalive - handled automatically
            }
            Ok(Message::Close(_)) => {
                log::info!("Kline WebSocket closed (likely 24hr timeout)");
                break;
            }
            Err(e) => {
                return Err(e.into());
            }
            _ => {}
        }
    }

    Ok(())
}
