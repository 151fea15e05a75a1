pub mod config;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use handler::OrdersHandler;
pub use server::{build_router, HttpServer};
