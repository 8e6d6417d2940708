//! # vnscript
//!
//! A dialogue scripting engine for visual-novel style conversations with game
//! characters. Scripts are ordered lists of JSON action records; the engine
//! executes them step by step, suspends on player choices, and keeps
//! per-session and per-entity variables that are saved at checkpoints.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use vnscript::{EngineConfig, LocalHost, Program, SaveBook, Session, SessionIdentity};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let program = Program::load(vec![
//!     json!({"type": "dialogue", "label": "Mira", "content": "Hello!"}),
//!     json!({"type": "choice", "choice": [{"label": "bye", "text": "Bye"}]}),
//!     json!({"type": "label", "label": "bye"}),
//!     json!({"type": "dialogue", "content": "See you."}),
//! ]);
//!
//! let identity = SessionIdentity::new("villager", "Mira", "player-1", true);
//! let mut session = Session::new(
//!     Arc::new(program),
//!     identity,
//!     LocalHost::default(),
//!     &SaveBook::new(),
//!     EngineConfig::default(),
//! );
//!
//! session.start()?;
//! for choice in &session.dialogue_state().choices {
//!     println!("{}", choice.text);
//! }
//! session.submit_choice("bye")?;
//! assert_eq!(session.dialogue_state().content.as_deref(), Some("See you."));
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level API
//!
//! [`runtime::step`] executes one action as a pure function of the state, and
//! [`runtime::run`] loops it until the program suspends. [`runner::SessionRunner`]
//! wraps a [`Session`] with an async [`storage::SaveStore`].

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod library;
pub mod logging;
pub mod program;
pub mod runner;
pub mod runtime;
pub mod script;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{CommandPolicy, EngineConfig};
pub use error::{EngineError, ScriptError, SessionError, VariableError};
pub use host::{Host, LocalHost, NullHost};
pub use library::{LibraryError, LoadFailure, ScriptLibrary};
pub use program::Program;
pub use runner::{RunnerError, SessionRunner, Turn};
pub use runtime::{resume, run, step};
pub use script::Script;
pub use session::Session;
pub use storage::{
    InMemorySaveStore, JsonSaveStore, PersistedRecord, SaveBook, SaveStore, StorageError,
};
pub use types::{Action, DialogueState, Event, Output, SessionIdentity, State, Status, Value};
