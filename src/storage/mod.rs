//! Storage module for saving and loading session progress
//!
//! Progress is split the way it is scoped: a [`GlobalRecord`] per entity holds
//! the global variable scope, and a [`LocalRecord`] per session uid holds the
//! program counter and the last checkpoint label. A [`SaveBook`] is the
//! persisted collection of both.

use crate::program::Program;
use crate::types::state::{FinishReason, SessionIdentity, State, Status, VariableStore};
use crate::types::value::Value;
use serde::{Deserialize, Serialize};

pub mod store;

pub use store::{InMemorySaveStore, JsonSaveStore, SaveStore, StorageError};

/// Global scope of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalRecord {
    pub entity_type: String,
    pub entity_name: String,
    #[serde(default)]
    pub variables: VariableStore,
}

/// Resume position of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub entity_type: String,
    pub entity_name: String,
    pub uid: String,
    #[serde(default)]
    pub counter: usize,
    #[serde(default)]
    pub checkpoint: Option<String>,
}

/// Everything written at a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub global: GlobalRecord,
    pub local: LocalRecord,
}

/// Persisted progress records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveBook {
    #[serde(default)]
    pub globals: Vec<GlobalRecord>,
    #[serde(default)]
    pub locals: Vec<LocalRecord>,
}

impl SaveBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_global(&self, entity_type: &str, entity_name: &str) -> Option<&GlobalRecord> {
        self.globals
            .iter()
            .find(|g| g.entity_type == entity_type && g.entity_name == entity_name)
    }

    pub fn find_local(&self, identity: &SessionIdentity) -> Option<&LocalRecord> {
        self.locals.iter().find(|l| {
            l.entity_type == identity.entity_type
                && l.entity_name == identity.entity_name
                && l.uid == identity.uid
        })
    }

    /// Replace the matching records, or append them.
    pub fn upsert(&mut self, record: PersistedRecord) {
        let PersistedRecord { global, local } = record;

        match self.globals.iter_mut().find(|g| {
            g.entity_type == global.entity_type && g.entity_name == global.entity_name
        }) {
            Some(existing) => *existing = global,
            None => self.globals.push(global),
        }

        match self.locals.iter_mut().find(|l| {
            l.entity_type == local.entity_type
                && l.entity_name == local.entity_name
                && l.uid == local.uid
        }) {
            Some(existing) => *existing = local,
            None => self.locals.push(local),
        }
    }
}

/// Hydrate `state` from the records that belong to `identity`.
///
/// With no records the counter starts at 0 with an empty global scope. A
/// local record at counter 0 with a resolvable checkpoint resumes just past
/// that checkpoint label.
pub fn load_progress(
    state: &mut State,
    identity: &SessionIdentity,
    program: &Program,
    book: &SaveBook,
) {
    state.globals = book
        .find_global(&identity.entity_type, &identity.entity_name)
        .map(|g| g.variables.clone())
        .unwrap_or_default();

    state.pc = match book.find_local(identity) {
        None => 0,
        Some(local) if local.counter != 0 => local.counter,
        Some(local) => local
            .checkpoint
            .as_deref()
            .and_then(|label| program.resolve(label))
            .map(|position| position + 1)
            .unwrap_or(0),
    };
    log::debug!(
        "[Storage] Loaded progress for {}/{}#{}: PC={}, {} globals",
        identity.entity_type,
        identity.entity_name,
        identity.uid,
        state.pc,
        state.globals.len()
    );
}

/// Capture the persisted view of `state`.
///
/// Deterministic: the same state always produces the same record. Sessions
/// that ended (other than by an external stop) restart from the beginning or
/// from their checkpoint next time, so they persist counter 0.
pub fn save_progress(
    state: &State,
    identity: &SessionIdentity,
    checkpoint_var: &str,
) -> PersistedRecord {
    let counter = match state.status {
        Status::Finished(FinishReason::Stopped) => state.pc,
        Status::Finished(_) | Status::Aborted(_) => 0,
        _ => state.pc,
    };
    let checkpoint = match state.locals.get(checkpoint_var) {
        Some(Value::String(label)) => Some(label.clone()),
        _ => None,
    };

    PersistedRecord {
        global: GlobalRecord {
            entity_type: identity.entity_type.clone(),
            entity_name: identity.entity_name.clone(),
            variables: state.globals.clone(),
        },
        local: LocalRecord {
            entity_type: identity.entity_type.clone(),
            entity_name: identity.entity_name.clone(),
            uid: identity.uid.clone(),
            counter,
            checkpoint,
        },
    }
}

/// Save a record to bytes using JSON serialization
pub fn encode(record: &PersistedRecord) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(json.into_bytes())
}

/// Load a record from bytes using JSON deserialization
pub fn decode(bytes: &[u8]) -> anyhow::Result<PersistedRecord> {
    let json = String::from_utf8(bytes.to_vec())?;
    let record = serde_json::from_str(&json)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> SessionIdentity {
        SessionIdentity::new("villager", "Mira", "player-1", true)
    }

    fn program() -> Program {
        Program::load(vec![
            json!({"type": "dialogue", "content": "intro"}),
            json!({"type": "label", "label": "day2"}),
            json!({"type": "dialogue", "content": "second day"}),
        ])
    }

    #[test]
    fn absent_records_start_fresh() {
        let mut state = State::new();
        state.pc = 9;
        state.globals.set("stale", Value::Bool(true));

        load_progress(&mut state, &identity(), &program(), &SaveBook::new());

        assert_eq!(state.pc, 0);
        assert!(state.globals.is_empty());
    }

    #[test]
    fn save_then_load_restores_progress() {
        let mut state = State::new();
        state.pc = 2;
        state.status = Status::Running;
        state.globals.set("affection", Value::Number(4.0));
        state.locals.set("scratch", Value::from("dropped"));

        let mut book = SaveBook::new();
        book.upsert(save_progress(&state, &identity(), "checkpoint"));

        let mut restored = State::new();
        load_progress(&mut restored, &identity(), &program(), &book);
        assert_eq!(restored.pc, 2);
        assert_eq!(restored.globals, state.globals);
        assert!(restored.locals.is_empty());
    }

    #[test]
    fn finished_session_resumes_from_checkpoint() {
        let mut state = State::new();
        state.pc = 3;
        state.status = Status::Finished(FinishReason::FinishAction);
        state.locals.set("checkpoint", Value::from("day2"));

        let record = save_progress(&state, &identity(), "checkpoint");
        assert_eq!(record.local.counter, 0);
        assert_eq!(record.local.checkpoint.as_deref(), Some("day2"));

        let mut book = SaveBook::new();
        book.upsert(record);
        let mut restored = State::new();
        load_progress(&mut restored, &identity(), &program(), &book);
        assert_eq!(restored.pc, 2);
    }

    #[test]
    fn stopped_session_keeps_its_counter() {
        let mut state = State::new();
        state.pc = 1;
        state.status = Status::Finished(FinishReason::Stopped);
        assert_eq!(save_progress(&state, &identity(), "checkpoint").local.counter, 1);
    }

    #[test]
    fn saving_twice_is_byte_identical() {
        let mut state = State::new();
        state.pc = 1;
        state.globals.set("b", Value::Number(2.0));
        state.globals.set("a", Value::List(vec!["x".into()]));

        let first = encode(&save_progress(&state, &identity(), "checkpoint")).unwrap();
        let second = encode(&save_progress(&state, &identity(), "checkpoint")).unwrap();
        assert_eq!(first, second);
        assert_eq!(decode(&first).unwrap(), decode(&second).unwrap());
    }

    #[test]
    fn upsert_replaces_matching_records_only() {
        let mut book = SaveBook::new();
        let mut state = State::new();
        state.status = Status::Running;

        state.pc = 1;
        book.upsert(save_progress(&state, &identity(), "checkpoint"));
        let other = SessionIdentity::new("villager", "Mira", "player-2", true);
        state.pc = 2;
        book.upsert(save_progress(&state, &other, "checkpoint"));
        state.pc = 3;
        book.upsert(save_progress(&state, &identity(), "checkpoint"));

        assert_eq!(book.globals.len(), 1);
        assert_eq!(book.locals.len(), 2);
        assert_eq!(book.find_local(&identity()).unwrap().counter, 3);
        assert_eq!(book.find_local(&other).unwrap().counter, 2);
    }

    #[test]
    fn load_invalid_data_returns_error() {
        assert!(decode(b"invalid json data").is_err());
    }
}
