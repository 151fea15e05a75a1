use std::sync::Arc;
use std::time::Duration;

use flashmm_core::Market;
use flashmm_data::SnapshotBuffer;
use flashmm_engine::sim::price_walk::PRICE_FLOOR;
use flashmm_engine::sim::signal::RETURN_WINDOW;
use flashmm_engine::{
    shared, spawn_tick_loop, EngineConfig, MarketMakerEngine, PublishOutcome, PublisherConfig,
    QuoteBuilder, QuoteInputs, SnapshotPublisher, Stage, TickStatus, TimerSlot,
};

fn engine_at(config: EngineConfig, market: Market, stage: Stage) -> MarketMakerEngine {
    let mut engine = MarketMakerEngine::new(config, market);
    while engine.stage() < stage {
        engine.advance_stage().unwrap();
    }
    engine
}

/// Long run at full quoting: every tick must leave the engine inside its bounds
#[test]
fn test_bounds_hold_over_long_run() {
    for market in Market::ALL {
        let config = EngineConfig::default().with_seed(2024);
        let trade_cap = config.trade_history;
        let mut engine = engine_at(config, market, Stage::TelemetryOn);

        for t in 0..3_000u64 {
            let report = engine.tick(t);
            assert_eq!(report.status, TickStatus::Processed);

            assert!(engine.mid() >= PRICE_FLOOR);
            assert!(engine.return_window_len() <= RETURN_WINDOW);
            assert!(engine.trades().count() <= trade_cap);

            let book = engine.book();
            assert_eq!(book.bids.len(), 3);
            assert_eq!(book.asks.len(), 3);
            for level in book.bids.iter().chain(&book.asks) {
                assert!((50.0..=500.0).contains(&level.size));
                assert_eq!(level.size.fract(), 0.0);
            }
            for pair in book.bids.windows(2) {
                assert!(pair[1].price <= pair[0].price);
            }
            for pair in book.asks.windows(2) {
                assert!(pair[1].price >= pair[0].price);
            }

            let view = engine.view();
            assert!((view.pnl - (view.cash + view.position * view.mid)).abs() < 1e-6);
            assert!(view.confidence >= 0.52 && view.confidence < 0.64);
        }

        // Unarmed failsafe never pauses
        assert!(!engine.is_paused());
        assert!(engine.metrics().total_fills() > 0);
    }
}

#[test]
fn test_kill_switch_latches_until_resume() {
    // Two returns always sit at |z| = 1, so the second processed tick trips
    let config = EngineConfig {
        z_threshold: 0.5,
        ..EngineConfig::default().with_seed(11)
    };
    let mut engine = engine_at(config, Market::SeiUsdc, Stage::FailsafeArmed);

    let first = engine.tick(1);
    assert!(first.kill_switch.is_none());
    let mid_before = engine.mid();

    let second = engine.tick(2);
    assert!(second.kill_switch.is_some());
    assert!(second.widened);
    assert!(engine.is_paused());
    // The tripping tick still completes
    assert_ne!(engine.mid(), mid_before);
    assert!(!engine.book().is_empty());

    let frozen = engine.view();
    assert!(frozen.kill_reason.is_some());
    for t in 3..40 {
        assert_eq!(engine.tick(t).status, TickStatus::Paused);
    }
    assert_eq!(engine.view(), frozen);
    assert_eq!(engine.metrics().kill_switch_trips, 1);

    engine.resume();
    assert!(engine.kill_reason().is_none());
    assert_eq!(engine.tick(50).status, TickStatus::Processed);
}

#[test]
fn test_predictions_hidden_until_predicting() {
    let mut engine = engine_at(
        EngineConfig::default().with_seed(5),
        Market::WethUsdc,
        Stage::Normalized,
    );
    for t in 0..10 {
        engine.tick(t);
    }
    assert_eq!(engine.view().predicted_delta, 0.0);
    assert!(engine.book().is_empty());

    engine.advance_to(Stage::Predicting).unwrap();
    engine.tick(11);
    let view = engine.view();
    assert_ne!(view.predicted_delta, 0.0);
    assert!(view.predicted_delta.abs() <= 0.5);
    assert!(engine.book().is_empty());
}

#[test]
fn test_widening_never_narrows_quotes() {
    let builder = QuoteBuilder::default();
    for i in 0..200 {
        let inputs = QuoteInputs {
            mid: 3000.0 + i as f64 * 3.0,
            predicted_delta: (i as f64 - 100.0) / 200.0,
            confidence: 0.52 + (i % 12) as f64 * 0.01,
            position: (i as f64 - 100.0) * 0.05,
            widen: false,
        };
        let normal = builder.build(Market::WethUsdc, &inputs);
        let wide = builder.build(Market::WethUsdc, &QuoteInputs { widen: true, ..inputs });

        for (n, w) in normal.bids.iter().zip(&wide.bids) {
            assert!(w.price <= n.price);
        }
        for (n, w) in normal.asks.iter().zip(&wide.asks) {
            assert!(w.price >= n.price);
        }
    }
}

#[tokio::test]
async fn test_router_bound_engine_publishes_throttled() {
    let buffer = Arc::new(SnapshotBuffer::new());
    let publisher = SnapshotPublisher::spawn(buffer.clone(), PublisherConfig::default()).unwrap();

    let mut engine = engine_at(
        EngineConfig::default().with_seed(8),
        Market::SeiUsdc,
        Stage::Quoting,
    );
    engine.attach_publisher(publisher);

    // Quoting alone does not publish
    assert_eq!(engine.tick(1).publish, None);

    engine.advance_to(Stage::RouterBound).unwrap();
    assert_eq!(engine.tick(2).publish, Some(PublishOutcome::Queued));
    for t in 3..8 {
        assert_eq!(engine.tick(t).publish, Some(PublishOutcome::Throttled));
    }

    let counts = engine.detach_publisher().unwrap().shutdown().await;
    assert_eq!(counts.delivered, 1);

    let recent = buffer.recent(20).await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].market, "SEI/USDC");
    assert_eq!(recent[0].timestamp, 2);
    assert!(recent[0].best_bid.is_some());
    assert!(recent[0].best_ask.is_some());
}

#[tokio::test]
async fn test_tick_loop_drives_shared_engine() {
    let engine = shared(engine_at(
        EngineConfig::default().with_seed(3),
        Market::SeiUsdc,
        Stage::Ingesting,
    ));
    let mut slot = TimerSlot::new("tick");

    spawn_tick_loop(&mut slot, engine.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(120)).await;
    slot.cancel();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let ticks = engine.lock().await.metrics().ticks_processed;
    assert!(ticks >= 3, "only {} ticks", ticks);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.lock().await.metrics().ticks_processed, ticks);
}
