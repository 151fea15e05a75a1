/// Network label the health endpoint reports unless overridden
pub const DEFAULT_HEALTH_NETWORK: &str = "Sei V2 testnet";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Reported by the health endpoint
    pub network_name: String,
    /// Snapshots kept before the oldest is evicted
    pub buffer_capacity: usize,
    /// Snapshots returned by a GET
    pub recent_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7880,
            network_name: DEFAULT_HEALTH_NETWORK.to_string(),
            buffer_capacity: flashmm_data::buffer::DEFAULT_CAPACITY,
            recent_limit: flashmm_data::buffer::DEFAULT_RECENT_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
