//! Headless operator session: owns the shared engine and the periodic tasks
//! that the workflow switches on and off.

use anyhow::{Context, Result};
use flashmm_core::Market;
use flashmm_data::session::{self, MARKET_KEY, PAUSED_KEY};
use flashmm_data::telemetry::{mock_wallet_balance, DEFAULT_PING_TIMEOUT};
use flashmm_data::{
    format_amount, ChainClient, NetworkStatus, RouterClient, SessionStore, TelemetryClient,
    WalletSession,
};
use flashmm_engine::{
    spawn_tick_loop, DashboardView, PublishCounts, PublisherConfig, SharedEngine,
    SnapshotPublisher, Stage, TimerSlot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const SNAPSHOT_POLL_PERIOD: Duration = Duration::from_millis(2000);
pub const HEALTH_POLL_PERIOD: Duration = Duration::from_millis(5000);
const HTTP_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolved endpoints the operator talks to
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub router_url: String,
    pub health_url: String,
    /// Chain REST endpoint; `None` keeps block height and balance mocked
    pub chain_rest_url: Option<String>,
}

/// What the polling tasks have observed so far
#[derive(Debug)]
pub struct TelemetryState {
    pub network: NetworkStatus,
    pub wallet_balance: String,
    pub router_snapshots: usize,
    pub last_router_mid: Option<f64>,
    /// Mock balance and the address it was drawn for
    mock_balance: Option<(String, String)>,
    rng: StdRng,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self {
            network: NetworkStatus::default(),
            wallet_balance: "0".to_string(),
            router_snapshots: 0,
            last_router_mid: None,
            mock_balance: None,
            rng: StdRng::from_entropy(),
        }
    }
}

impl TelemetryState {
    /// Show the live balance when there is one. Otherwise show a mock
    /// balance, drawn once per connected address.
    fn update_wallet_balance(&mut self, wallet: &WalletSession, live: Option<String>) {
        let address = match wallet.address.as_deref() {
            Some(address) => address,
            None => {
                self.mock_balance = None;
                self.wallet_balance = "0".to_string();
                return;
            }
        };
        if let Some(balance) = live {
            self.wallet_balance = balance;
            return;
        }
        let balance = match &self.mock_balance {
            Some((drawn_for, balance)) if drawn_for == address => balance.clone(),
            _ => {
                let balance = mock_wallet_balance(&mut self.rng);
                self.mock_balance = Some((address.to_string(), balance.clone()));
                balance
            }
        };
        self.wallet_balance = balance;
    }

    /// Forget the mock balance so the next poll draws a fresh one
    fn clear_wallet(&mut self) {
        self.mock_balance = None;
        self.wallet_balance = "0".to_string();
    }
}

/// Final figures reported when the session ends
#[derive(Debug)]
pub struct SessionSummary {
    pub view: DashboardView,
    pub publish: Option<PublishCounts>,
    pub recent_log: Vec<String>,
}

pub struct Operator {
    engine: SharedEngine,
    session: Arc<dyn SessionStore>,
    router: Arc<RouterClient>,
    telemetry: Arc<TelemetryClient>,
    chain: Option<Arc<ChainClient>>,
    health_url: String,
    state: Arc<Mutex<TelemetryState>>,
    tick_period: Duration,
    tick_slot: TimerSlot,
    snapshot_slot: TimerSlot,
    health_slot: TimerSlot,
}

impl Operator {
    pub fn new(
        engine: SharedEngine,
        session: Arc<dyn SessionStore>,
        endpoints: Endpoints,
        tick_period: Duration,
    ) -> Result<Self> {
        let router = RouterClient::new(endpoints.router_url, HTTP_TIMEOUT)?;
        let telemetry = TelemetryClient::new()?;
        let chain = endpoints
            .chain_rest_url
            .map(|url| ChainClient::new(url, HTTP_TIMEOUT).map(Arc::new))
            .transpose()?;

        Ok(Self {
            engine,
            session,
            router: Arc::new(router),
            telemetry: Arc::new(telemetry),
            chain,
            health_url: endpoints.health_url,
            state: Arc::new(Mutex::new(TelemetryState::default())),
            tick_period,
            tick_slot: TimerSlot::new("tick"),
            snapshot_slot: TimerSlot::new("snapshots"),
            health_slot: TimerSlot::new("health"),
        })
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Attach a publisher that posts snapshots to the router endpoint
    pub async fn bind_router(&self, config: PublisherConfig) -> Result<()> {
        let publisher = SnapshotPublisher::spawn(self.router.clone(), config)
            .context("Failed to start router publisher")?;
        tracing::info!("Publishing snapshots to {}", self.router.url());
        self.engine.lock().await.attach_publisher(publisher);
        Ok(())
    }

    /// Enable the next stage and start whatever it switches on
    pub async fn advance(&mut self) -> Result<Stage> {
        let stage = self.engine.lock().await.advance_stage()?;
        self.sync_timers().await;
        Ok(stage)
    }

    /// Walk the workflow one stage at a time up to `target`
    pub async fn bring_up(&mut self, target: Stage, step_delay: Duration) -> Result<()> {
        while self.engine.lock().await.stage() < target {
            self.advance().await?;
            if !step_delay.is_zero() {
                tokio::time::sleep(step_delay).await;
            }
        }
        Ok(())
    }

    /// Switch markets, restarting the tick loop so the new market starts on
    /// a fresh period. Returns false when `market` is already selected.
    pub async fn switch_market(&mut self, market: Market) -> bool {
        let switched = self.engine.lock().await.select_market(market);
        if switched {
            session::save(self.session.as_ref(), MARKET_KEY, &market.symbol());
            if self.tick_slot.is_active() {
                spawn_tick_loop(&mut self.tick_slot, self.engine.clone(), self.tick_period);
            }
        }
        switched
    }

    /// Start or stop the periodic tasks to match the enabled stages
    async fn sync_timers(&mut self) {
        let (ingesting, telemetry_on) = {
            let engine = self.engine.lock().await;
            let workflow = engine.workflow();
            (
                workflow.is_enabled(Stage::Ingesting),
                workflow.is_enabled(Stage::TelemetryOn),
            )
        };

        if ingesting && !self.tick_slot.is_active() {
            spawn_tick_loop(&mut self.tick_slot, self.engine.clone(), self.tick_period);
        } else if !ingesting {
            self.tick_slot.cancel();
        }

        if telemetry_on {
            if !self.snapshot_slot.is_active() {
                self.start_snapshot_poll();
            }
            if !self.health_slot.is_active() {
                self.start_health_poll();
            }
        } else {
            self.snapshot_slot.cancel();
            self.health_slot.cancel();
            self.state.lock().await.clear_wallet();
        }
    }

    fn start_snapshot_poll(&mut self) {
        let router = self.router.clone();
        let state = self.state.clone();
        self.snapshot_slot.start_immediate(SNAPSHOT_POLL_PERIOD, move || {
            let router = router.clone();
            let state = state.clone();
            async move {
                // Failed polls keep the previous figures
                if let Some(recent) = router.poll_recent().await {
                    let mut state = state.lock().await;
                    state.router_snapshots = recent.len();
                    state.last_router_mid = recent.first().map(|s| s.mid);
                }
            }
        });
    }

    fn start_health_poll(&mut self) {
        let telemetry = self.telemetry.clone();
        let chain = self.chain.clone();
        let session = self.session.clone();
        let url = self.health_url.clone();
        let state = self.state.clone();
        self.health_slot.start_immediate(HEALTH_POLL_PERIOD, move || {
            let telemetry = telemetry.clone();
            let chain = chain.clone();
            let session = session.clone();
            let url = url.clone();
            let state = state.clone();
            async move {
                let latency = telemetry.ping_latency(&url, DEFAULT_PING_TIMEOUT).await;
                let wallet = WalletSession::load(session.as_ref());

                let (height, balance) = match &chain {
                    Some(chain) => {
                        let height = chain.latest_block_height().await;
                        let balance = match wallet.address.as_deref() {
                            Some(address) => Some(format_amount(
                                chain.balances(address).await.as_deref(),
                                "usei",
                                6,
                            )),
                            None => None,
                        };
                        (height, balance)
                    }
                    None => (None, None),
                };

                let mut guard = state.lock().await;
                let state = &mut *guard;
                state.network.observe(latency, &mut state.rng);
                if height.is_some() {
                    state.network.block_height = height;
                }
                state.update_wallet_balance(&wallet, balance);
            }
        });
    }

    /// One line of dashboard and network state
    pub async fn status_line(&self) -> String {
        let view = self.engine.lock().await.view();
        let state = self.state.lock().await;
        let network = match (state.network.latency_ms, state.network.block_height) {
            (Some(ms), Some(height)) => format!("{}ms #{}", ms, height),
            (None, Some(height)) => format!("down #{}", height),
            _ => "n/a".to_string(),
        };
        let router = match state.last_router_mid {
            Some(mid) => format!(
                "{} (last {})",
                state.router_snapshots,
                view.market.format_price(mid)
            ),
            None => state.router_snapshots.to_string(),
        };
        format!(
            "{}{} | network={} router={} balance={}",
            if self.is_running() { "" } else { "[stopped] " },
            view,
            network,
            router,
            state.wallet_balance
        )
    }

    pub fn is_running(&self) -> bool {
        self.tick_slot.is_active()
    }

    /// Stop every task, persist the session and report final figures
    pub async fn shutdown(mut self) -> SessionSummary {
        self.tick_slot.cancel();
        self.snapshot_slot.cancel();
        self.health_slot.cancel();

        let (view, publisher, recent_log) = {
            let mut engine = self.engine.lock().await;
            engine.metrics().report();
            let recent_log = engine
                .operator_log()
                .lines()
                .take(8)
                .map(str::to_string)
                .collect();
            (engine.view(), engine.detach_publisher(), recent_log)
        };

        session::save(self.session.as_ref(), PAUSED_KEY, &view.paused);
        session::save(self.session.as_ref(), MARKET_KEY, &view.market.symbol());

        let publish = match publisher {
            Some(publisher) => Some(publisher.shutdown().await),
            None => None,
        };

        SessionSummary {
            view,
            publish,
            recent_log,
        }
    }
}
