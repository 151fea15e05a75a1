//! Session-scoped key-value persistence.
//!
//! The store is a port: operators and the engine only see `get`, `set` and
//! `subscribe`. Values are JSON so typed callers can round-trip anything
//! serde understands, and a missing or unreadable value falls back to the
//! caller's default.

use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;

pub const PAUSED_KEY: &str = "flashmm.paused";
pub const MARKET_KEY: &str = "flashmm.market";
pub const WALLET_ADDRESS_KEY: &str = "flashmm.wallet.address";
pub const WALLET_NAME_KEY: &str = "flashmm.wallet.name";

const EVENT_CAPACITY: usize = 64;

/// Emitted for every write to the store
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub key: String,
    pub value: Value,
}

/// Key-value persistence for one operator session
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// In-memory store; entries expire after sitting idle for the session TTL
pub struct MemorySessionStore {
    entries: Cache<String, Value>,
    events: broadcast::Sender<SessionEvent>,
}

impl MemorySessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Cache::builder().time_to_idle(idle_ttl).build(),
            events,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value.clone());
        // No subscribers is fine
        let _ = self.events.send(SessionEvent {
            key: key.to_string(),
            value,
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Read `key` as `T`, falling back to `default` when absent or unreadable
pub fn load_or<T: DeserializeOwned>(store: &dyn SessionStore, key: &str, default: T) -> T {
    match store.get(key) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable session value for {}: {}", key, e);
            default
        }),
        None => default,
    }
}

/// Write `value` under `key`; serialization failures are logged and skipped
pub fn save<T: Serialize>(store: &dyn SessionStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(key, json),
        Err(e) => tracing::warn!("Failed to persist session value {}: {}", key, e),
    }
}

/// Wallet identity remembered for the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSession {
    pub address: Option<String>,
    pub wallet_name: Option<String>,
}

impl WalletSession {
    pub fn load(store: &dyn SessionStore) -> Self {
        Self {
            address: load_or(store, WALLET_ADDRESS_KEY, None),
            wallet_name: load_or(store, WALLET_NAME_KEY, None),
        }
    }

    pub fn save(&self, store: &dyn SessionStore) {
        save(store, WALLET_ADDRESS_KEY, &self.address);
        save(store, WALLET_NAME_KEY, &self.wallet_name);
    }

    /// Whether `event` touched one of the wallet keys
    pub fn is_wallet_event(event: &SessionEvent) -> bool {
        event.key == WALLET_ADDRESS_KEY || event.key == WALLET_NAME_KEY
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// `sei1abcd…uvwxyz` style abbreviation
    pub fn short_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let chars: Vec<char> = address.chars().collect();
        if chars.len() <= 14 {
            return Some(address.to_string());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        Some(format!("{}…{}", head, tail))
    }
}
