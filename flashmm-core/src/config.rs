use clap::Args;

use crate::types::{Market, MarketError};

/// Operator-visible network configuration.
///
/// Every value has a default and can be overridden by flag or environment
/// variable. The chain endpoints are informational; the simulation never
/// talks to them.
#[derive(Debug, Clone, Args)]
pub struct NetworkConfig {
    /// Network display name
    #[arg(long, env = "FLASHMM_NETWORK_NAME", default_value = "Sei Testnet")]
    pub network_name: String,

    /// Chain identifier
    #[arg(long, env = "FLASHMM_CHAIN_ID", default_value = "atlantic-2")]
    pub chain_id: String,

    /// Chain RPC endpoint
    #[arg(long, env = "FLASHMM_RPC_URL", default_value = "https://rpc.atlantic-2.seinetwork.io")]
    pub rpc_url: String,

    /// Chain REST endpoint
    #[arg(long, env = "FLASHMM_REST_URL", default_value = "https://rest.atlantic-2.seinetwork.io")]
    pub rest_url: String,

    /// CLOB websocket endpoint
    #[arg(
        long,
        env = "FLASHMM_WS_URL",
        default_value = "wss://rpc.atlantic-2.seinetwork.io/websocket"
    )]
    pub ws_url: String,

    /// Order router endpoint path or URL
    #[arg(long, env = "FLASHMM_ROUTER_URL", default_value = "/api/orders")]
    pub router_url: String,

    /// Health endpoint path or URL
    #[arg(long, env = "FLASHMM_HEALTH_URL", default_value = "/api/health")]
    pub health_url: String,

    /// Faucet link
    #[arg(long, env = "FLASHMM_FAUCET_URL", default_value = "https://faucet.ping.pub/sei")]
    pub faucet_url: String,

    /// Block explorer link
    #[arg(
        long,
        env = "FLASHMM_EXPLORER_URL",
        default_value = "https://www.mintscan.io/sei-testnet"
    )]
    pub explorer_url: String,

    /// Supported markets (comma-separated)
    #[arg(long, env = "FLASHMM_MARKETS", default_value = "SEI/USDC,wETH/USDC")]
    pub markets: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_name: "Sei Testnet".to_string(),
            chain_id: "atlantic-2".to_string(),
            rpc_url: "https://rpc.atlantic-2.seinetwork.io".to_string(),
            rest_url: "https://rest.atlantic-2.seinetwork.io".to_string(),
            ws_url: "wss://rpc.atlantic-2.seinetwork.io/websocket".to_string(),
            router_url: "/api/orders".to_string(),
            health_url: "/api/health".to_string(),
            faucet_url: "https://faucet.ping.pub/sei".to_string(),
            explorer_url: "https://www.mintscan.io/sei-testnet".to_string(),
            markets: "SEI/USDC,wETH/USDC".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Market symbols from the comma-separated list, trimmed, blanks skipped
    pub fn market_symbols(&self) -> Vec<String> {
        self.markets
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Parse the configured symbols into supported markets
    pub fn supported_markets(&self) -> Result<Vec<Market>, MarketError> {
        self.market_symbols().iter().map(|s| s.parse()).collect()
    }

    /// Resolve a possibly relative endpoint path against `base_url`
    pub fn resolve(base_url: &str, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path_or_url.trim_start_matches('/')
            )
        }
    }
}
