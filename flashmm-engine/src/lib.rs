pub mod engine;
pub mod metrics;
pub mod publish;
pub mod sim;

// Re-export commonly used items from engine module
pub use engine::{
    shared, spawn_tick_loop, DashboardView, EngineConfig, MarketMakerEngine, OperatorLog,
    SharedEngine, Stage, TickReport, TickStatus, TimerSlot, Workflow, WorkflowError,
};

// Re-export commonly used items from publish and sim modules
pub use metrics::EngineMetrics;
pub use publish::{PublishCounts, PublishOutcome, PublisherConfig, SnapshotPublisher};
pub use sim::{
    FillOutcome, FillSimulator, KillReason, QuoteBuilder, QuoteConfig, QuoteInputs,
    ReturnWindow, RiskGovernor, RiskLimits, RiskVerdict, Signal, SignalEstimator,
};
