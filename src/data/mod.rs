// Rolling store, feeds and CSV persistence
pub mod csv_store;
pub mod history;
pub mod kline_event;
pub mod kline_stream;
pub mod replay;

// Re-export commonly used types
pub use csv_store::{CsvSeriesStore, SeriesPersistence};
pub use history::RollingHistory;
pub use kline_event::KlineEvent;
pub use kline_stream::{BinanceKlineFeed, CandleFeed, FeedItem};
pub use replay::ReplayFeed;
