//! Error types for the engine, the session API and the script container

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a running session
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineError {
    #[error("malformed '{tag}' action at position {position}: {reason}")]
    MalformedAction {
        position: usize,
        tag: String,
        reason: String,
    },

    #[error("unresolved label '{label}' referenced at position {position}")]
    UnresolvedLabel { label: String, position: usize },

    #[error("step limit of {limit} actions exceeded in a single run")]
    StepLimitExceeded { limit: usize },
}

impl EngineError {
    pub fn malformed(position: usize, tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAction {
            position,
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn unresolved_label(label: impl Into<String>, position: usize) -> Self {
        Self::UnresolvedLabel {
            label: label.into(),
            position,
        }
    }
}

/// Variable mutation errors. Never fatal: the dispatcher logs and moves on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VariableError {
    #[error("type mismatch for variable '{variable}': expected {expected}, got {actual}")]
    TypeMismatch {
        variable: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("result for variable '{variable}' is not a finite number")]
    NotFinite { variable: String },
}

/// Errors returned by the session API to its caller
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("session is not waiting for a choice")]
    NotAwaitingChoice,

    #[error("session is not waiting for the player to continue")]
    NotAwaitingContinue,

    #[error("'{label}' is not one of the pending choices")]
    UnknownChoice { label: String },

    #[error("session has already ended")]
    AlreadyEnded,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors decoding a script container
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid script JSON in {file}: {source}")]
    InvalidJson {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("script {file} has no valid uuid")]
    MissingId { file: String },
}
