//! Core types for the vnscript library
//!
//! - Action: decoded script records
//! - Value: variable values
//! - State: runtime state including program counter and variable scopes
//! - DialogueState: the rendering snapshot a client displays
//! - Event: player and host input
//! - Output: results of a run slice and host side effects

pub mod action;
pub mod dialogue;
pub mod event;
pub mod output;
pub mod state;
pub mod value;

pub use action::{Action, ChoiceOption, Condition, ModifyOp, Mutation, Predicate, SpriteLayout};
pub use dialogue::{DialogueState, SpriteState};
pub use event::Event;
pub use output::{Effect, Output, StepOutcome};
pub use state::{FinishReason, SessionIdentity, State, Status, VariableStore, Wait};
pub use value::Value;
