//! Debugging feature flags.
//!
//! All of these are only consulted under `cfg(debug_assertions)`.

/// Emit every raw websocket payload received from the kline stream.
pub const PRINT_STREAM_PAYLOADS: bool = false;

/// Emit a per-timeframe row count after each aggregation pass.
pub const PRINT_TIMEFRAME_SUMMARY: bool = false;

/// Emit file paths and row counts for each CSV read/write.
pub const PRINT_SERDE: bool = false;
