pub mod activity;
pub mod config;
pub mod market_maker;
pub mod scheduler;
pub mod view;
pub mod workflow;

use std::sync::Arc;
use tokio::sync::Mutex;

pub use activity::OperatorLog;
pub use config::EngineConfig;
pub use market_maker::{MarketMakerEngine, TickReport, TickStatus};
pub use scheduler::{spawn_tick_loop, TimerSlot};
pub use view::DashboardView;
pub use workflow::{Stage, Workflow, WorkflowError};

/// Engine handle shared between the tick task and readers
pub type SharedEngine = Arc<Mutex<MarketMakerEngine>>;

pub fn shared(engine: MarketMakerEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}
