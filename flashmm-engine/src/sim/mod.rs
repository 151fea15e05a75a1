/// Per-tick simulation components: price walk, signal, risk, quotes, fills
pub mod fill_sim;
pub mod price_walk;
pub mod quote_builder;
pub mod risk;
pub mod signal;

pub use fill_sim::{FillOutcome, FillSimulator};
pub use quote_builder::{QuoteBuilder, QuoteConfig, QuoteInputs};
pub use risk::{KillReason, RiskGovernor, RiskLimits, RiskVerdict};
pub use signal::{ReturnWindow, Signal, SignalEstimator};
