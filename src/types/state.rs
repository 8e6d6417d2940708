//! Runtime state representation

use crate::error::EngineError;
use crate::types::dialogue::DialogueState;
use crate::types::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A variable scope.
///
/// Ordered so that serializing the same scope twice yields identical bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    vars: BTreeMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown names read as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }
}

impl From<BTreeMap<String, Value>> for VariableStore {
    fn from(vars: BTreeMap<String, Value>) -> Self {
        Self { vars }
    }
}

impl From<VariableStore> for BTreeMap<String, Value> {
    fn from(store: VariableStore) -> Self {
        store.vars
    }
}

/// Who a session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub entity_type: String,
    pub entity_name: String,
    pub uid: String,
    pub is_day: bool,
}

impl SessionIdentity {
    pub fn new(
        entity_type: impl Into<String>,
        entity_name: impl Into<String>,
        uid: impl Into<String>,
        is_day: bool,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_name: entity_name.into(),
            uid: uid.into(),
            is_day,
        }
    }
}

/// What the engine is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wait {
    /// A pending choice list is published
    Choice,
    /// A dialogue line is shown and the player has to continue
    Continue,
}

/// Why a session finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    EndOfScript,
    FinishAction,
    IdleChatExhausted,
    Stopped,
}

/// Lifecycle of one session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Idle,
    Running,
    AwaitingInput(Wait),
    Finished(FinishReason),
    Aborted(EngineError),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished(_) | Status::Aborted(_))
    }
}

/// Runtime state of one dialogue session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct State {
    /// Program counter - current position in the program
    pub pc: usize,
    pub status: Status,
    pub locals: VariableStore,
    pub globals: VariableStore,
    pub dialogue: DialogueState,
    pub is_day: bool,
    /// Random number generator seed, re-drawn whenever randomness is consumed
    pub rng_seed: u64,
}

impl State {
    /// Create new initial state
    pub fn new() -> Self {
        Self {
            is_day: true,
            ..Default::default()
        }
    }

    /// Create state with specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng_seed: seed,
            ..Self::new()
        }
    }
}
