//! One player's dialogue session
//!
//! A [`Session`] owns the runtime state for one entity/uid pair, threads it
//! through the runtime, and hands side effects to its [`Host`].

use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::host::{Host, apply_effects};
use crate::program::Program;
use crate::runtime;
use crate::storage::{self, PersistedRecord, SaveBook};
use crate::types::{
    dialogue::DialogueState,
    event::Event,
    output::Output,
    state::{SessionIdentity, State, Status, VariableStore},
};
use std::sync::Arc;

pub struct Session<H: Host> {
    program: Arc<Program>,
    identity: SessionIdentity,
    host: H,
    config: EngineConfig,
    state: State,
    checkpoint_due: bool,
}

impl<H: Host> Session<H> {
    /// Create a session and hydrate it from `book`.
    pub fn new(
        program: Arc<Program>,
        identity: SessionIdentity,
        host: H,
        book: &SaveBook,
        config: EngineConfig,
    ) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let mut state = State::with_seed(seed);
        state.is_day = identity.is_day;
        storage::load_progress(&mut state, &identity, &program, book);

        Self {
            program,
            identity,
            host,
            config,
            state,
            checkpoint_due: false,
        }
    }

    /// Begin executing from the hydrated program counter.
    pub fn start(&mut self) -> Result<Output, SessionError> {
        match self.state.status {
            Status::Idle => {}
            Status::Running | Status::AwaitingInput(_) => return Ok(self.run()),
            Status::Finished(_) | Status::Aborted(_) => return Err(SessionError::AlreadyEnded),
        }
        log::info!(
            "[Session] Starting {}/{}#{} at PC={}",
            self.identity.entity_type,
            self.identity.entity_name,
            self.identity.uid,
            self.state.pc
        );
        self.state.status = Status::Running;
        Ok(self.run())
    }

    /// Resume after a choice. `label` must be one of the pending choices.
    pub fn submit_choice(&mut self, label: &str) -> Result<Output, SessionError> {
        self.resume(Event::Choice {
            label: label.to_string(),
        })
    }

    /// Resume after a dialogue pause.
    pub fn advance(&mut self) -> Result<Output, SessionError> {
        self.resume(Event::Continue)
    }

    /// External shutdown. Progress is kept so the session can resume later.
    pub fn stop(&mut self) {
        let was_terminal = self.state.status.is_terminal();
        // Stop cannot fail
        let _ = runtime::resume(&mut self.state, &self.program, &Event::Stop);
        if !was_terminal {
            log::info!("[Session] Stopped at PC={}", self.state.pc);
            self.checkpoint_due = true;
        }
    }

    fn resume(&mut self, event: Event) -> Result<Output, SessionError> {
        if let Err(err) = runtime::resume(&mut self.state, &self.program, &event) {
            if self.state.status.is_terminal() {
                self.checkpoint_due = true;
            }
            return Err(err);
        }
        Ok(self.run())
    }

    fn run(&mut self) -> Output {
        let state = std::mem::take(&mut self.state);
        let (state, output) = runtime::run(state, &self.program, &self.config);
        self.state = state;

        apply_effects(&mut self.host, &output.effects);
        if output.reached_checkpoint() {
            self.checkpoint_due = true;
        }
        output
    }

    pub fn dialogue_state(&self) -> &DialogueState {
        &self.state.dialogue
    }

    pub fn status(&self) -> &Status {
        &self.state.status
    }

    pub fn counter(&self) -> usize {
        self.state.pc
    }

    pub fn locals(&self) -> &VariableStore {
        &self.state.locals
    }

    pub fn globals(&self) -> &VariableStore {
        &self.state.globals
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Day/night may change between runs.
    pub fn set_day(&mut self, is_day: bool) {
        self.identity.is_day = is_day;
        self.state.is_day = is_day;
    }

    /// Snapshot of the current progress.
    pub fn save_progress(&self) -> PersistedRecord {
        storage::save_progress(&self.state, &self.identity, &self.config.checkpoint_var)
    }

    /// The progress record while a checkpoint is due and not yet saved.
    pub fn pending_checkpoint(&self) -> Option<PersistedRecord> {
        self.checkpoint_due.then(|| self.save_progress())
    }

    /// Mark the due checkpoint as written.
    pub fn checkpoint_saved(&mut self) {
        self.checkpoint_due = false;
    }

    /// The progress record, once, after a checkpoint was reached.
    pub fn take_checkpoint(&mut self) -> Option<PersistedRecord> {
        let record = self.pending_checkpoint()?;
        self.checkpoint_saved();
        Some(record)
    }
}
