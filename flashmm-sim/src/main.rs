mod operator;

use anyhow::{bail, Result};
use clap::Parser;
use flashmm_core::{Market, NetworkConfig};
use flashmm_data::session::{self, MARKET_KEY, PAUSED_KEY};
use flashmm_data::{MemorySessionStore, SessionStore, WalletSession};
use flashmm_engine::{shared, EngineConfig, MarketMakerEngine, PublisherConfig, Stage};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use operator::{Endpoints, Operator};

/// FlashMM headless operator
///
/// Brings the market-making workflow up stage by stage, runs the tick loop
/// for a fixed duration and reports the final dashboard.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Market to quote; defaults to the first enabled market
    #[arg(short, long)]
    market: Option<Market>,

    /// Workflow stage to bring the engine up to
    #[arg(short = 't', long, default_value = "failsafe-armed")]
    target_stage: Stage,

    /// Seconds to run once the workflow is up
    #[arg(short, long, default_value = "30")]
    duration_secs: u64,

    /// Tick period in milliseconds
    #[arg(long, default_value = "200")]
    tick_ms: u64,

    /// Pause between workflow stages during bring-up, in milliseconds
    #[arg(long, default_value = "0")]
    stage_delay_ms: u64,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Failsafe |z| threshold
    #[arg(short, long, default_value = "5.0")]
    z_threshold: f64,

    /// Base URL of the order router server
    #[arg(short, long, default_value = "http://127.0.0.1:7880")]
    server_url: String,

    /// Query the chain REST endpoint for block height and balances
    #[arg(long)]
    live_chain: bool,

    /// Wallet address to remember for the session
    #[arg(short, long)]
    wallet: Option<String>,

    /// Wallet display name
    #[arg(long)]
    wallet_name: Option<String>,

    /// Switch to this market partway through the run
    #[arg(long, requires = "switch_after_secs")]
    switch_market: Option<Market>,

    /// Seconds into the run before switching markets
    #[arg(long, requires = "switch_market")]
    switch_after_secs: Option<u64>,

    /// Seconds between dashboard log lines
    #[arg(long, default_value = "5")]
    status_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    network: NetworkConfig,
}

impl Args {
    /// Parse log level from string
    fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints {
            router_url: NetworkConfig::resolve(&self.server_url, &self.network.router_url),
            health_url: NetworkConfig::resolve(&self.server_url, &self.network.health_url),
            chain_rest_url: self.live_chain.then(|| self.network.rest_url.clone()),
        }
    }

    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_ms: self.tick_ms,
            z_threshold: self.z_threshold,
            seed: self.seed,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("Tick period must be non-zero");
        }
        if self.z_threshold.is_nan() || self.z_threshold <= 0.0 {
            bail!("z threshold must be positive, got {}", self.z_threshold);
        }
        let supported = self.network.supported_markets()?;
        for market in self.market.iter().chain(&self.switch_market) {
            if !supported.contains(market) {
                bail!("Market {} is not enabled (markets: {})", market, self.network.markets);
            }
        }
        Ok(())
    }
}

/// Market from the flag, else the session's last market, else the first
/// enabled market. A fresh in-memory session holds no market yet.
fn resolve_market(args: &Args, store: &dyn SessionStore) -> Result<Market> {
    if let Some(market) = args.market {
        return Ok(market);
    }
    let fallback = args
        .network
        .supported_markets()?
        .first()
        .copied()
        .unwrap_or_default();
    let saved: String = session::load_or(store, MARKET_KEY, fallback.symbol().to_string());
    Ok(saved.parse().unwrap_or(fallback))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.parse_log_level())
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    args.validate()?;

    // Session values live for this process only
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
    if args.wallet.is_some() {
        WalletSession {
            address: args.wallet.clone(),
            wallet_name: args.wallet_name.clone(),
        }
        .save(store.as_ref());
    }

    let market = resolve_market(&args, store.as_ref())?;
    let endpoints = args.endpoints();

    info!("🚀 FlashMM Operator Starting");
    info!("Configuration:");
    info!("  Market: {}", market);
    info!("  Target stage: {}", args.target_stage);
    info!("  Duration: {}s", args.duration_secs);
    info!("  Tick: {}ms", args.tick_ms);
    info!("  Seed: {:?}", args.seed);
    info!("  z threshold: {}", args.z_threshold);
    info!("  Network: {} ({})", args.network.network_name, args.network.chain_id);
    info!("  Router: {}", endpoints.router_url);
    info!("  Health: {}", endpoints.health_url);
    if let Some(wallet) = WalletSession::load(store.as_ref()).short_address() {
        info!("  Wallet: {}", wallet);
    }

    let mut engine = MarketMakerEngine::new(args.engine_config(), market);
    engine.restore_paused(session::load_or(store.as_ref(), PAUSED_KEY, false));

    let mut operator = Operator::new(
        shared(engine),
        store.clone(),
        endpoints,
        Duration::from_millis(args.tick_ms),
    )?;

    if args.target_stage >= Stage::RouterBound {
        operator.bind_router(PublisherConfig::default()).await?;
    }
    operator
        .bring_up(args.target_stage, Duration::from_millis(args.stage_delay_ms))
        .await?;

    run(&mut operator, &args).await;

    let summary = operator.shutdown().await;

    info!("📊 Session Summary:");
    info!("  {}", summary.view);
    if let Some(reason) = &summary.view.kill_reason {
        info!("  Kill switch: {}", reason);
    }
    if let Some(counts) = summary.publish {
        info!(
            "  Publishes: queued={} delivered={} failed={} throttled={} dropped={}",
            counts.queued, counts.delivered, counts.failed, counts.throttled, counts.dropped
        );
    }
    info!("  Recent activity:");
    for line in &summary.recent_log {
        info!("    {}", line);
    }
    info!("✅ Operator finished");

    Ok(())
}

/// Run until the duration elapses or Ctrl-C, logging status periodically
async fn run(operator: &mut Operator, args: &Args) {
    let deadline = tokio::time::sleep(Duration::from_secs(args.duration_secs));
    tokio::pin!(deadline);

    let switch_after = tokio::time::sleep(Duration::from_secs(args.switch_after_secs.unwrap_or(0)));
    tokio::pin!(switch_after);
    let mut pending_switch = args.switch_market;

    let mut status = tokio::time::interval(Duration::from_secs(args.status_interval_secs.max(1)));
    status.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = &mut switch_after, if pending_switch.is_some() => {
                if let Some(market) = pending_switch.take() {
                    if operator.switch_market(market).await {
                        info!("Switched market to {}", market);
                    }
                }
            }
            _ = status.tick() => info!("{}", operator.status_line().await),
        }
    }
}
