use flashmm_core::now_ms;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::SharedEngine;

/// Holder for the one periodic task of a concern.
///
/// Starting a new task cancels whatever the slot held before, and dropping
/// the slot cancels its task.
pub struct TimerSlot {
    name: &'static str,
    active: Option<(CancellationToken, JoinHandle<()>)>,
}

impl TimerSlot {
    pub fn new(name: &'static str) -> Self {
        Self { name, active: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run `task` every `period`, first after one full period
    pub fn start<F, Fut>(&mut self, period: Duration, task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.start_at(Instant::now() + period, period, task);
    }

    /// Run `task` immediately, then every `period`
    pub fn start_immediate<F, Fut>(&mut self, period: Duration, task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.start_at(Instant::now(), period, task);
    }

    fn start_at<F, Fut>(&mut self, first: Instant, period: Duration, mut task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let name = self.name;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => task().await,
                }
            }
            tracing::debug!("Timer '{}' stopped", name);
        });

        tracing::debug!("Timer '{}' started: period={:?}", self.name, period);
        self.active = Some((token, handle));
    }

    /// Cancel the running task, if any
    pub fn cancel(&mut self) {
        if let Some((token, _handle)) = self.active.take() {
            token.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .map_or(false, |(token, handle)| !token.is_cancelled() && !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Drive `engine` from `slot` at `period`
pub fn spawn_tick_loop(slot: &mut TimerSlot, engine: SharedEngine, period: Duration) {
    slot.start(period, move || {
        let engine = engine.clone();
        async move {
            engine.lock().await.tick(now_ms());
        }
    });
}
