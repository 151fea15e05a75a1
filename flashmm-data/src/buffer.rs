use std::collections::VecDeque;

use flashmm_core::OrderSnapshot;
use tokio::sync::RwLock;

/// Maximum number of snapshots retained
pub const DEFAULT_CAPACITY: usize = 500;

/// Number of snapshots returned to pollers
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Bounded, append-only snapshot store.
///
/// Shared by every publisher; when full the oldest entry is evicted.
/// Nothing survives a process restart.
#[derive(Debug)]
pub struct SnapshotBuffer {
    items: RwLock<VecDeque<OrderSnapshot>>,
    capacity: usize,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1)),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a snapshot, evicting from the front while over capacity.
    /// Returns the length after the append.
    pub async fn push(&self, snapshot: OrderSnapshot) -> usize {
        let mut items = self.items.write().await;
        items.push_back(snapshot);
        while items.len() > self.capacity {
            items.pop_front();
        }
        items.len()
    }

    /// Up to `limit` snapshots, most recent first
    pub async fn recent(&self, limit: usize) -> Vec<OrderSnapshot> {
        let items = self.items.read().await;
        items.iter().rev().take(limit).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
