use std::sync::Arc;

use flashmm_core::PartialOrderSnapshot;
use flashmm_data::session::{self, MARKET_KEY, PAUSED_KEY};
use flashmm_data::{MemorySessionStore, SessionStore, SnapshotBuffer, SnapshotSink, WalletSession};

fn snapshot(mid: f64, ts: u64) -> flashmm_core::OrderSnapshot {
    PartialOrderSnapshot {
        mid: Some(mid),
        ..Default::default()
    }
    .into_snapshot(ts)
}

#[tokio::test]
async fn test_concurrent_publishers_share_one_buffer() {
    let buffer = Arc::new(SnapshotBuffer::with_capacity(50));
    let sink: Arc<dyn SnapshotSink> = buffer.clone();

    let mut handles = Vec::new();
    for writer in 0..4u64 {
        let sink = sink.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25u64 {
                sink.publish(snapshot(i as f64, writer * 100 + i)).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 100 writes into a 50-slot buffer
    assert_eq!(buffer.len().await, 50);
    assert_eq!(buffer.recent(20).await.len(), 20);
}

#[tokio::test]
async fn test_operator_session_roundtrip() {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
    let mut events = store.subscribe();

    assert!(!session::load_or(store.as_ref(), PAUSED_KEY, false));
    session::save(store.as_ref(), PAUSED_KEY, &true);
    session::save(store.as_ref(), MARKET_KEY, &"wETH/USDC");

    WalletSession {
        address: Some("sei1qy352eufqy352eufqy352eufqy352eufabcdef".to_string()),
        wallet_name: Some("Compass".to_string()),
    }
    .save(store.as_ref());

    assert!(session::load_or(store.as_ref(), PAUSED_KEY, false));
    let market: String = session::load_or(store.as_ref(), MARKET_KEY, String::new());
    assert_eq!(market, "wETH/USDC");

    let wallet = WalletSession::load(store.as_ref());
    assert!(wallet.is_connected());
    assert_eq!(wallet.short_address().as_deref(), Some("sei1qy35…abcdef"));

    let mut wallet_events = 0;
    while let Ok(event) = events.try_recv() {
        if WalletSession::is_wallet_event(&event) {
            wallet_events += 1;
        }
    }
    assert_eq!(wallet_events, 2);
}
