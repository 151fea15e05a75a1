//! Operator workflow.
//!
//! The pipeline is brought up one stage at a time. The current stage is a
//! single index, so a later stage being enabled always implies every earlier
//! one is too.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Cannot advance from {current} to {requested}: stages must be enabled in order")]
    SkippedStage { current: Stage, requested: Stage },

    #[error("Cannot go back from {current} to {requested} without a reset")]
    Backwards { current: Stage, requested: Stage },

    #[error("Workflow already complete at {0}")]
    AlreadyComplete(Stage),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),
}

/// Pipeline stages in bring-up order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    Disconnected,
    Connected,
    Ingesting,
    Normalized,
    Predicting,
    Quoting,
    RouterBound,
    TelemetryOn,
    FailsafeArmed,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Disconnected,
        Stage::Connected,
        Stage::Ingesting,
        Stage::Normalized,
        Stage::Predicting,
        Stage::Quoting,
        Stage::RouterBound,
        Stage::TelemetryOn,
        Stage::FailsafeArmed,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Disconnected => "disconnected",
            Stage::Connected => "connected",
            Stage::Ingesting => "ingesting",
            Stage::Normalized => "normalized",
            Stage::Predicting => "predicting",
            Stage::Quoting => "quoting",
            Stage::RouterBound => "router-bound",
            Stage::TelemetryOn => "telemetry-on",
            Stage::FailsafeArmed => "failsafe-armed",
        }
    }

    /// Activity log line recorded when the stage is entered
    pub fn entry_message(self) -> &'static str {
        match self {
            Stage::Disconnected => "Workflow reset",
            Stage::Connected => "Connected to Sei CLOB",
            Stage::Ingesting => "Real-time ingestion started",
            Stage::Normalized => "Normalization enabled",
            Stage::Predicting => "Prediction loop started",
            Stage::Quoting => "Quoting enabled",
            Stage::RouterBound => "Order router bound",
            Stage::TelemetryOn => "Telemetry enabled",
            Stage::FailsafeArmed => "Failsafe armed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| WorkflowError::UnknownStage(s.to_string()))
    }
}

/// Single-index stage machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workflow {
    current: Stage,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Whether `stage` has been reached
    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.current >= stage
    }

    /// Move to the next stage
    pub fn advance(&mut self) -> Result<Stage, WorkflowError> {
        let next = self
            .current
            .next()
            .ok_or(WorkflowError::AlreadyComplete(self.current))?;
        self.current = next;
        Ok(next)
    }

    /// Enable `stage`. Returns `Ok(false)` when it is already the current
    /// stage, `Ok(true)` when it is the next one.
    pub fn advance_to(&mut self, stage: Stage) -> Result<bool, WorkflowError> {
        if stage == self.current {
            return Ok(false);
        }
        if stage < self.current {
            return Err(WorkflowError::Backwards {
                current: self.current,
                requested: stage,
            });
        }
        if Some(stage) != self.current.next() {
            return Err(WorkflowError::SkippedStage {
                current: self.current,
                requested: stage,
            });
        }
        self.current = stage;
        Ok(true)
    }

    pub fn reset(&mut self) {
        self.current = Stage::Disconnected;
    }
}
