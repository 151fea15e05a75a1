pub mod buffer;
pub mod chain;
pub mod router;
pub mod session;
pub mod sink;
pub mod telemetry;

// Re-export commonly used items
pub use buffer::SnapshotBuffer;
pub use chain::{format_amount, ChainClient, Coin};
pub use router::RouterClient;
pub use session::{MemorySessionStore, SessionEvent, SessionStore, WalletSession};
pub use sink::SnapshotSink;
pub use telemetry::{NetworkStatus, TelemetryClient};
