use flashmm_core::OrderSnapshot;
use serde::Serialize;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "FlashMM Agent";

/// `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub name: &'static str,
    pub status: &'static str,
    pub network: String,
    /// ISO-8601
    pub timestamp: String,
}

/// `GET /api/orders`
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub ok: bool,
    pub count: usize,
    /// Most recent first
    pub data: Vec<OrderSnapshot>,
}

/// Successful `POST /api/orders`
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
    pub ack: OrderSnapshot,
}

/// Any rejected request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: message.into(),
        }
    }
}
