//! Output from runtime execution

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Side effects the engine asks its host to carry out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    GiveItem { item: String, amount: u32 },
    Command { command: String },
    /// A `next` action recorded a resumption label; progress should be saved
    Checkpoint { label: Option<String> },
}

/// Result of executing one action
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Keep going with the next action
    Continue,
    /// Suspended until the player responds
    AwaitingInput,
    Finished,
    Aborted(EngineError),
}

impl StepOutcome {
    pub fn is_continue(&self) -> bool {
        matches!(self, StepOutcome::Continue)
    }
}

/// Result of one run slice: every effect produced along the way plus
/// the outcome that stopped the loop
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub outcome: StepOutcome,
    pub effects: Vec<Effect>,
    /// Number of actions executed in this slice
    pub steps: usize,
}

impl Output {
    pub fn new(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            effects: Vec::new(),
            steps: 0,
        }
    }

    /// Whether progress should be persisted after this slice
    pub fn reached_checkpoint(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::Checkpoint { .. }))
            || matches!(
                self.outcome,
                StepOutcome::Finished | StepOutcome::Aborted(_)
            )
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}
