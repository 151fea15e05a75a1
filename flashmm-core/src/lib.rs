pub mod config;
pub mod math;
pub mod types;

// Re-export common types
pub use config::NetworkConfig;
pub use types::{
    now_ms, InventoryState, Market, MarketError, MarketProfile, OrderBookSnapshot, OrderSnapshot,
    PartialOrderSnapshot, QuoteLevel, Side, TimestampMS, Trade,
};
