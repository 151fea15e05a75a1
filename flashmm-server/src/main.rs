use anyhow::{bail, Context, Result};
use clap::Parser;
use flashmm_core::{Market, NetworkConfig};
use flashmm_data::SnapshotBuffer;
use flashmm_engine::{
    shared, spawn_tick_loop, EngineConfig, MarketMakerEngine, PublisherConfig, SharedEngine,
    SnapshotPublisher, Stage, TimerSlot,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flashmm_server::{HttpServer, ServerConfig};

#[derive(Parser)]
#[command(name = "flashmm-server")]
#[command(about = "HTTP order router and health endpoint for the FlashMM simulation")]
struct Cli {
    /// Server host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(long, default_value = "7880")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Network label reported by the health endpoint
    #[arg(long, default_value = flashmm_server::config::DEFAULT_HEALTH_NETWORK)]
    health_network: String,

    /// Run an in-process engine that publishes into the buffer
    #[arg(long)]
    simulate: bool,

    /// Market simulated with --simulate
    #[arg(long, default_value = "SEI/USDC")]
    market: String,

    /// RNG seed for --simulate
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds between dashboard log lines with --simulate
    #[arg(long, default_value = "10")]
    status_interval_secs: u64,

    #[command(flatten)]
    network: NetworkConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "flashmm_server={},flashmm_engine={},flashmm_data={}",
                cli.log_level, cli.log_level, cli.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("FlashMM Server Starting");
    tracing::info!("Configuration:");
    tracing::info!("  Host: {}", cli.host);
    tracing::info!("  Port: {}", cli.port);
    tracing::info!("  Network: {} ({})", cli.network.network_name, cli.network.chain_id);
    tracing::info!("  Markets: {}", cli.network.markets);
    tracing::info!("  Simulate: {}", cli.simulate);

    let config = ServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        network_name: cli.health_network.clone(),
        ..Default::default()
    };

    let buffer = Arc::new(SnapshotBuffer::with_capacity(config.buffer_capacity));

    // Slots live until the server exits; dropping them stops the tasks
    let mut tick_slot = TimerSlot::new("tick");
    let mut status_slot = TimerSlot::new("status");

    if cli.simulate {
        let market = select_market(&cli.network, &cli.market)?;
        let engine = start_simulation(market, cli.seed, buffer.clone())?;
        let tick_ms = engine.lock().await.config().tick_ms;

        spawn_tick_loop(&mut tick_slot, engine.clone(), Duration::from_millis(tick_ms));
        status_slot.start(
            Duration::from_secs(cli.status_interval_secs.max(1)),
            move || {
                let engine = engine.clone();
                async move {
                    let engine = engine.lock().await;
                    tracing::info!("{}", engine.view());
                    engine.metrics().report();
                }
            },
        );
    }

    let server = HttpServer::new(config, buffer);
    server.run().await?;

    Ok(())
}

fn select_market(network: &NetworkConfig, symbol: &str) -> Result<Market> {
    let market: Market = symbol.parse()?;
    let supported = network
        .supported_markets()
        .context("Invalid market list")?;
    if !supported.contains(&market) {
        bail!("Market {} is not enabled (markets: {})", market, network.markets);
    }
    Ok(market)
}

/// Engine brought up to the router stage, publishing into `buffer`
fn start_simulation(
    market: Market,
    seed: Option<u64>,
    buffer: Arc<SnapshotBuffer>,
) -> Result<SharedEngine> {
    let config = EngineConfig {
        seed,
        ..Default::default()
    };
    let mut engine = MarketMakerEngine::new(config, market);
    while engine.stage() < Stage::RouterBound {
        engine.advance_stage()?;
    }

    let publisher = SnapshotPublisher::spawn(buffer, PublisherConfig::default())
        .context("Failed to start snapshot publisher")?;
    engine.attach_publisher(publisher);

    tracing::info!("In-process simulation running on {}", market);
    Ok(shared(engine))
}
