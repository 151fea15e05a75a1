//! Engine performance metrics
//!
//! Counters and latency samples accumulated by the tick loop:
//! - Processed and skipped ticks, widening and kill-switch trips
//! - Fill counts and filled volume per side
//! - Publish outcomes (queued, throttled, dropped)
//! - Simulated engine latency distribution

use std::collections::VecDeque;

use crate::publish::PublishOutcome;
use crate::sim::FillOutcome;
use flashmm_core::Side;

/// Latency samples kept for percentiles
const LATENCY_SAMPLES: usize = 256;

/// Metrics for the tick loop
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Ticks that ran the full pipeline
    pub ticks_processed: u64,

    /// Ticks skipped because the engine was paused
    pub ticks_paused: u64,

    /// Ticks quoted with the extra risk widening
    pub widened_ticks: u64,

    /// Times the kill switch latched
    pub kill_switch_trips: u64,

    pub bid_fills: u64,
    pub ask_fills: u64,

    /// Total filled size across both sides
    pub filled_volume: f64,

    pub publishes_queued: u64,
    pub publishes_throttled: u64,
    pub publishes_dropped: u64,

    /// Recent simulated engine latencies (milliseconds)
    latency_samples: VecDeque<u64>,
}

impl EngineMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_latency(&mut self, latency_ms: u64) {
        if self.latency_samples.len() == LATENCY_SAMPLES {
            self.latency_samples.pop_front();
        }
        self.latency_samples.push_back(latency_ms);
    }

    pub fn record_fills(&mut self, outcome: &FillOutcome) {
        self.bid_fills += outcome.count(Side::Bid) as u64;
        self.ask_fills += outcome.count(Side::Ask) as u64;
        self.filled_volume += outcome.volume();
    }

    pub fn record_publish(&mut self, outcome: PublishOutcome) {
        match outcome {
            PublishOutcome::Queued => self.publishes_queued += 1,
            PublishOutcome::Throttled => self.publishes_throttled += 1,
            PublishOutcome::Dropped => self.publishes_dropped += 1,
        }
    }

    pub fn total_fills(&self) -> u64 {
        self.bid_fills + self.ask_fills
    }

    /// Latency percentile over the recent window, `None` before the first tick
    pub fn latency_percentile(&self, p: f64) -> Option<u64> {
        if self.latency_samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<u64> = self.latency_samples.iter().copied().collect();
        sorted.sort_unstable();
        Some(percentile(&sorted, p))
    }

    /// Report metrics to tracing logs
    pub fn report(&self) {
        tracing::info!(
            "Engine Metrics: ticks={}, paused_ticks={}, widened={}, kill_trips={}, fills={}/{} (bid/ask), volume={:.0}, publish q/t/d={}/{}/{}, latency p50={:?}ms p90={:?}ms",
            self.ticks_processed,
            self.ticks_paused,
            self.widened_ticks,
            self.kill_switch_trips,
            self.bid_fills,
            self.ask_fills,
            self.filled_volume,
            self.publishes_queued,
            self.publishes_throttled,
            self.publishes_dropped,
            self.latency_percentile(50.0),
            self.latency_percentile(90.0),
        );
    }
}

/// Nearest-rank percentile from sorted data
fn percentile(sorted_data: &[u64], p: f64) -> u64 {
    let len = sorted_data.len();
    let idx = (p / 100.0 * (len - 1) as f64).round() as usize;
    sorted_data[idx.min(len - 1)]
}
