pub mod book;
pub mod inventory;
pub mod market;
pub mod order_snapshot;

// Re-export common types
pub use book::{OrderBookSnapshot, QuoteLevel, Side, Trade};
pub use inventory::InventoryState;
pub use market::{Market, MarketError, MarketProfile};
pub use order_snapshot::{OrderSnapshot, PartialOrderSnapshot};

/// Timestamp in milliseconds since Unix epoch
pub type TimestampMS = u64;

/// Current wall-clock time in milliseconds since Unix epoch
pub fn now_ms() -> TimestampMS {
    chrono::Utc::now().timestamp_millis() as TimestampMS
}
