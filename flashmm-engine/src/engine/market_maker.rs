use flashmm_core::{
    InventoryState, Market, OrderBookSnapshot, OrderSnapshot, TimestampMS, Trade,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use super::activity::OperatorLog;
use super::config::EngineConfig;
use super::view::DashboardView;
use super::workflow::{Stage, Workflow, WorkflowError};
use crate::metrics::EngineMetrics;
use crate::publish::{PublishOutcome, SnapshotPublisher};
use crate::sim::price_walk::next_mid;
use crate::sim::{
    FillSimulator, KillReason, QuoteBuilder, QuoteInputs, RiskGovernor, SignalEstimator,
};

/// Simulated engine latency is `LATENCY_BASE_MS + [0, LATENCY_JITTER_MS)`
const LATENCY_BASE_MS: u64 = 80;
const LATENCY_JITTER_MS: u64 = 100;

/// Confidence shown before the first prediction
const INITIAL_CONFIDENCE: f64 = 0.55;
const INITIAL_LATENCY_MS: u64 = 120;

/// How a tick was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickStatus {
    /// Ingestion not enabled yet
    #[default]
    Idle,
    /// Engine paused; nothing changed
    Paused,
    Processed,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub status: TickStatus,
    pub widened: bool,
    pub fills: usize,
    pub publish: Option<PublishOutcome>,
    /// Set on the tick that latched the kill switch
    pub kill_switch: Option<KillReason>,
}

impl TickReport {
    fn skipped(status: TickStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

/// Tick-driven market-making simulation.
///
/// Owns every piece of mutable simulation state. The tick task is the only
/// writer; readers take a [`DashboardView`] under the same lock.
pub struct MarketMakerEngine {
    config: EngineConfig,
    market: Market,
    workflow: Workflow,
    paused: bool,

    mid: f64,
    predicted_delta: f64,
    confidence: f64,
    z_score: f64,
    auto_widening: bool,
    latency_ms: u64,
    kill_reason: Option<KillReason>,

    book: OrderBookSnapshot,
    inventory: InventoryState,
    trades: VecDeque<Trade>,

    estimator: SignalEstimator,
    quote_builder: QuoteBuilder,
    risk: RiskGovernor,
    fills: FillSimulator,
    rng: StdRng,

    publisher: Option<SnapshotPublisher>,
    log: OperatorLog,
    metrics: EngineMetrics,
}

impl MarketMakerEngine {
    pub fn new(config: EngineConfig, market: Market) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            quote_builder: QuoteBuilder::new(config.quote_config()),
            risk: RiskGovernor::new(config.risk_limits()),
            trades: VecDeque::with_capacity(config.trade_history),
            market,
            workflow: Workflow::new(),
            paused: false,
            mid: market.profile().seed_mid,
            predicted_delta: 0.0,
            confidence: INITIAL_CONFIDENCE,
            z_score: 0.0,
            auto_widening: false,
            latency_ms: INITIAL_LATENCY_MS,
            kill_reason: None,
            book: OrderBookSnapshot::empty(),
            inventory: InventoryState::default(),
            estimator: SignalEstimator::new(),
            fills: FillSimulator::new(),
            rng,
            publisher: None,
            log: OperatorLog::new(),
            metrics: EngineMetrics::new(),
            config,
        }
    }

    /// Route snapshots through `publisher` once the router stage is enabled
    pub fn attach_publisher(&mut self, publisher: SnapshotPublisher) {
        tracing::info!("Publisher attached: sink={}", publisher.sink_name());
        self.publisher = Some(publisher);
    }

    pub fn detach_publisher(&mut self) -> Option<SnapshotPublisher> {
        self.publisher.take()
    }

    /// Advance the simulation by one step at wall-clock `now`
    pub fn tick(&mut self, now: TimestampMS) -> TickReport {
        if !self.workflow.is_enabled(Stage::Ingesting) {
            return TickReport::skipped(TickStatus::Idle);
        }
        if self.paused {
            self.metrics.ticks_paused += 1;
            return TickReport::skipped(TickStatus::Paused);
        }

        let mut report = TickReport {
            status: TickStatus::Processed,
            ..Default::default()
        };

        self.latency_ms = LATENCY_BASE_MS + self.rng.gen_range(0..LATENCY_JITTER_MS);

        let previous_mid = self.mid;
        let mid = next_mid(previous_mid, self.market, &mut self.rng);
        let signal = self
            .estimator
            .estimate(mid, previous_mid, self.market, &mut self.rng);

        if self.workflow.is_enabled(Stage::Predicting) {
            self.predicted_delta = signal.predicted_delta;
            self.confidence = signal.confidence;
        }
        self.z_score = signal.z_score;

        // Limits are checked against the inventory carried into this tick
        let verdict = self.risk.evaluate(
            self.inventory.position,
            mid,
            signal.z_score,
            self.workflow.is_enabled(Stage::FailsafeArmed),
        );
        self.auto_widening = verdict.widen;
        report.widened = verdict.widen;

        if let Some(reason) = self.risk.kill_reason(&verdict, signal.z_score) {
            self.paused = true;
            self.kill_reason = Some(reason);
            self.metrics.kill_switch_trips += 1;
            tracing::warn!("Kill switch latched: {}", reason);
            self.log.record(&format!("Kill switch: {}. Engine paused", reason));
            report.kill_switch = Some(reason);
        }

        let quotes = self.quote_builder.build(
            self.market,
            &QuoteInputs {
                mid,
                predicted_delta: signal.predicted_delta,
                confidence: signal.confidence,
                position: self.inventory.position,
                widen: verdict.widen,
            },
        );

        let quoting = self.workflow.is_enabled(Stage::Quoting);

        if quoting && self.workflow.is_enabled(Stage::RouterBound) {
            if let Some(publisher) = &self.publisher {
                let snapshot = OrderSnapshot {
                    timestamp: now,
                    market: self.market.symbol().to_string(),
                    mid,
                    predicted_delta: self.predicted_delta,
                    confidence: self.confidence,
                    best_bid: quotes.best_bid().copied(),
                    best_ask: quotes.best_ask().copied(),
                };
                let outcome = publisher.offer(snapshot);
                self.metrics.record_publish(outcome);
                report.publish = Some(outcome);
            }
        }

        if quoting {
            let outcome = self.fills.simulate(
                signal.predicted_delta,
                mid,
                quotes.best_bid(),
                quotes.best_ask(),
                now,
                &mut self.rng,
            );
            if !outcome.is_empty() {
                self.inventory
                    .apply(outcome.position_delta, outcome.cash_delta);
                self.metrics.record_fills(&outcome);
                report.fills = outcome.trades.len();
                // Bid before ask within a tick, both ahead of older trades
                for trade in outcome.trades.into_iter().rev() {
                    tracing::debug!(
                        "Fill {:?} {} @ {}",
                        trade.side,
                        trade.size,
                        self.market.format_price(trade.price)
                    );
                    self.trades.push_front(trade);
                }
                self.trades.truncate(self.config.trade_history);
            }
        }

        self.book = if quoting {
            quotes
        } else {
            OrderBookSnapshot::empty()
        };
        self.mid = mid;

        self.metrics.ticks_processed += 1;
        if verdict.widen {
            self.metrics.widened_ticks += 1;
        }
        self.metrics.record_latency(self.latency_ms);

        report
    }

    /// Enable the next workflow stage
    pub fn advance_stage(&mut self) -> Result<Stage, WorkflowError> {
        let stage = self.workflow.advance()?;
        self.log.record(stage.entry_message());
        Ok(stage)
    }

    /// Enable `stage` if it is the next one; a no-op when already current
    pub fn advance_to(&mut self, stage: Stage) -> Result<bool, WorkflowError> {
        let moved = self.workflow.advance_to(stage)?;
        if moved {
            self.log.record(stage.entry_message());
        }
        Ok(moved)
    }

    /// Back to `Disconnected`; the displayed book is cleared
    pub fn reset_workflow(&mut self) {
        self.workflow.reset();
        self.book = OrderBookSnapshot::empty();
        self.auto_widening = false;
        self.log.record(Stage::Disconnected.entry_message());
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.log.record("Engine paused by operator");
    }

    /// Clear the pause flag, including a latched kill switch
    pub fn resume(&mut self) {
        self.paused = false;
        self.kill_reason = None;
        self.log.record("Engine resumed by operator");
    }

    pub fn stop(&mut self) {
        self.paused = true;
        self.log
            .record("Agent stopped (engine paused). Reset the workflow to start over");
    }

    /// Restore a persisted pause flag without logging an operator action
    pub fn restore_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Switch markets. Price continuity restarts from the new seed and all
    /// inventory, trades, quotes and return history are discarded. Returns
    /// `false` when `market` is already selected.
    pub fn select_market(&mut self, market: Market) -> bool {
        if market == self.market {
            return false;
        }

        self.market = market;
        self.mid = market.profile().seed_mid;
        self.inventory.reset();
        self.trades.clear();
        self.book = OrderBookSnapshot::empty();
        self.estimator.reset();
        self.z_score = 0.0;
        self.auto_widening = false;
        self.log.record(&format!("Market switched to {}", market));
        true
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            market: self.market,
            stage: self.workflow.current(),
            paused: self.paused,
            mid: self.mid,
            predicted_delta: self.predicted_delta,
            confidence: self.confidence,
            z_score: self.z_score,
            auto_widening: self.auto_widening,
            latency_ms: self.latency_ms,
            position: self.inventory.position,
            cash: self.inventory.cash,
            pnl: self.inventory.mark_to_market(self.mid),
            spread_bps: self.book.spread_fraction(self.mid) * 10_000.0,
            book: self.book.clone(),
            trades: self.trades.iter().cloned().collect(),
            kill_reason: self.kill_reason.map(|r| r.to_string()),
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn stage(&self) -> Stage {
        self.workflow.current()
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn kill_reason(&self) -> Option<KillReason> {
        self.kill_reason
    }

    pub fn book(&self) -> &OrderBookSnapshot {
        &self.book
    }

    pub fn inventory(&self) -> &InventoryState {
        &self.inventory
    }

    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn return_window_len(&self) -> usize {
        self.estimator.window().len()
    }

    pub fn operator_log(&self) -> &OperatorLog {
        &self.log
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn publisher(&self) -> Option<&SnapshotPublisher> {
        self.publisher.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
