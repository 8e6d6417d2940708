//! Async driver that pairs a [`Session`] with a [`SaveStore`]
//!
//! Persistence failures never end the session: they are logged and returned
//! next to the run output, and the session keeps its progress in memory. A
//! checkpoint that failed to save stays due and is retried on the next flush.

use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::host::Host;
use crate::program::Program;
use crate::session::Session;
use crate::storage::{SaveStore, StorageError};
use crate::types::{output::Output, state::SessionIdentity};
use std::sync::Arc;
use thiserror::Error;

/// Failed input, with the save failure when the resulting checkpoint could
/// not be written either
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{session} (progress could not be saved: {persistence})")]
    Unsaved {
        session: SessionError,
        persistence: StorageError,
    },
}

impl RunnerError {
    pub fn session_error(&self) -> &SessionError {
        match self {
            RunnerError::Session(session) | RunnerError::Unsaved { session, .. } => session,
        }
    }

    pub fn save_error(&self) -> Option<&StorageError> {
        match self {
            RunnerError::Session(_) => None,
            RunnerError::Unsaved { persistence, .. } => Some(persistence),
        }
    }
}

/// Output of one run slice plus the outcome of saving it
#[derive(Debug)]
pub struct Turn {
    pub output: Output,
    /// Set when a checkpoint was due but could not be written
    pub save_error: Option<StorageError>,
}

pub struct SessionRunner<H: Host> {
    session: Session<H>,
    store: Arc<dyn SaveStore>,
}

impl<H: Host> SessionRunner<H> {
    /// Load the entity's records and hydrate a new session from them.
    pub async fn open(
        program: Arc<Program>,
        identity: SessionIdentity,
        host: H,
        config: EngineConfig,
        store: Arc<dyn SaveStore>,
    ) -> Result<Self, StorageError> {
        let book = store
            .load_book(&identity.entity_type, &identity.entity_name)
            .await?;
        let session = Session::new(program, identity, host, &book, config);
        Ok(Self { session, store })
    }

    pub async fn start(&mut self) -> Result<Turn, RunnerError> {
        let result = self.session.start();
        self.after_input(result).await
    }

    pub async fn submit_choice(&mut self, label: &str) -> Result<Turn, RunnerError> {
        let result = self.session.submit_choice(label);
        self.after_input(result).await
    }

    pub async fn advance(&mut self) -> Result<Turn, RunnerError> {
        let result = self.session.advance();
        self.after_input(result).await
    }

    /// Stop the session and save where it stopped.
    pub async fn stop(&mut self) -> Result<(), StorageError> {
        self.session.stop();
        self.flush().await
    }

    /// Write the pending checkpoint, if any. It stays pending on failure.
    pub async fn flush(&mut self) -> Result<(), StorageError> {
        let Some(record) = self.session.pending_checkpoint() else {
            return Ok(());
        };
        if let Err(e) = self.store.save_record(&record).await {
            log::error!(
                "[Runner] Failed to save progress for {}/{}#{}: {e}",
                record.local.entity_type,
                record.local.entity_name,
                record.local.uid
            );
            return Err(e);
        }
        self.session.checkpoint_saved();
        Ok(())
    }

    pub fn session(&self) -> &Session<H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<H> {
        &mut self.session
    }

    pub fn into_session(self) -> Session<H> {
        self.session
    }

    async fn after_input(
        &mut self,
        result: Result<Output, SessionError>,
    ) -> Result<Turn, RunnerError> {
        match result {
            Ok(output) => Ok(self.finish_turn(output).await),
            // An unresolvable choice aborts the session; its record is still due
            Err(session) => match self.flush().await {
                Ok(()) => Err(session.into()),
                Err(persistence) => Err(RunnerError::Unsaved {
                    session,
                    persistence,
                }),
            },
        }
    }

    async fn finish_turn(&mut self, output: Output) -> Turn {
        let save_error = self.flush().await.err();
        Turn { output, save_error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::host::NullHost;
    use crate::storage::{InMemorySaveStore, PersistedRecord, SaveBook};
    use crate::types::output::StepOutcome;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn program() -> Arc<Program> {
        Arc::new(Program::load(vec![
            json!({"type": "meta", "action": "create_global", "var": "met", "init": false}),
            json!({"type": "choice", "choice": [{"label": "hello", "text": "Hello"}]}),
            json!({"type": "label", "label": "hello"}),
            json!({"type": "modify_global", "var": "met", "action": "set", "value": true}),
            json!({"type": "next", "label": "hello"}),
            json!({"type": "finish_dialogue"}),
        ]))
    }

    fn identity() -> SessionIdentity {
        SessionIdentity::new("villager", "Mira", "player-1", true)
    }

    fn config() -> EngineConfig {
        EngineConfig {
            rng_seed: Some(7),
            ..EngineConfig::default()
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl SaveStore for BrokenStore {
        async fn load_book(&self, _: &str, _: &str) -> Result<SaveBook, StorageError> {
            Ok(SaveBook::new())
        }

        async fn save_record(&self, _: &PersistedRecord) -> Result<(), StorageError> {
            Err(StorageError::Io {
                message: "disk full".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    /// Fails the first `failures` saves, then delegates to memory.
    struct FlakyStore {
        failures: AtomicUsize,
        inner: InMemorySaveStore,
    }

    impl FlakyStore {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                inner: InMemorySaveStore::new(),
            }
        }
    }

    #[async_trait]
    impl SaveStore for FlakyStore {
        async fn load_book(&self, entity_type: &str, entity_name: &str) -> Result<SaveBook, StorageError> {
            self.inner.load_book(entity_type, entity_name).await
        }

        async fn save_record(&self, record: &PersistedRecord) -> Result<(), StorageError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Io {
                    message: "device busy".to_string(),
                    source: std::io::Error::other("device busy"),
                });
            }
            self.inner.save_record(record).await
        }
    }

    #[tokio::test]
    async fn checkpoints_are_written_to_the_store() {
        let store = Arc::new(InMemorySaveStore::new());
        let mut runner = SessionRunner::open(program(), identity(), NullHost, config(), store.clone())
            .await
            .unwrap();

        let turn = runner.start().await.unwrap();
        assert_eq!(turn.output.outcome, StepOutcome::AwaitingInput);
        assert!(store.load_book("villager", "Mira").await.unwrap().locals.is_empty());

        let turn = runner.submit_choice("hello").await.unwrap();
        assert_eq!(turn.output.outcome, StepOutcome::Finished);
        assert!(turn.save_error.is_none());

        let book = store.load_book("villager", "Mira").await.unwrap();
        let local = book.find_local(&identity()).unwrap();
        assert_eq!(local.counter, 0);
        assert_eq!(local.checkpoint.as_deref(), Some("hello"));
        assert_eq!(
            book.find_global("villager", "Mira").unwrap().variables.get("met"),
            Some(&crate::types::value::Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn save_failure_is_reported_and_session_continues() {
        let mut runner =
            SessionRunner::open(program(), identity(), NullHost, config(), Arc::new(BrokenStore))
                .await
                .unwrap();

        runner.start().await.unwrap();
        let turn = runner.submit_choice("hello").await.unwrap();
        assert!(matches!(turn.save_error, Some(StorageError::Io { .. })));
        assert_eq!(turn.output.outcome, StepOutcome::Finished);
        assert_eq!(
            runner.session().globals().get("met"),
            Some(&crate::types::value::Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn stop_saves_the_current_counter() {
        let store = Arc::new(InMemorySaveStore::new());
        let mut runner = SessionRunner::open(program(), identity(), NullHost, config(), store.clone())
            .await
            .unwrap();
        runner.start().await.unwrap();
        runner.stop().await.unwrap();

        let book = store.load_book("villager", "Mira").await.unwrap();
        assert_eq!(book.find_local(&identity()).unwrap().counter, 1);
    }

    #[tokio::test]
    async fn failed_checkpoint_is_retried_on_flush() {
        let store = Arc::new(FlakyStore::new(1));
        let mut runner = SessionRunner::open(program(), identity(), NullHost, config(), store.clone())
            .await
            .unwrap();
        runner.start().await.unwrap();

        let turn = runner.submit_choice("hello").await.unwrap();
        assert!(turn.save_error.is_some());
        assert!(store.load_book("villager", "Mira").await.unwrap().locals.is_empty());

        runner.flush().await.unwrap();
        let book = store.load_book("villager", "Mira").await.unwrap();
        assert_eq!(book.locals.len(), 1);
        assert_eq!(book.find_local(&identity()).unwrap().checkpoint.as_deref(), Some("hello"));
        assert!(runner.session().pending_checkpoint().is_none());
    }

    #[tokio::test]
    async fn abort_and_save_failure_are_both_reported() {
        let program = Arc::new(Program::load(vec![json!({
            "type": "choice",
            "choice": [{"label": "nowhere", "text": "???"}]
        })]));
        let mut runner =
            SessionRunner::open(program, identity(), NullHost, config(), Arc::new(BrokenStore))
                .await
                .unwrap();
        runner.start().await.unwrap();

        let err = runner.submit_choice("nowhere").await.unwrap_err();
        assert!(matches!(
            err.session_error(),
            SessionError::Engine(EngineError::UnresolvedLabel { .. })
        ));
        assert!(matches!(err.save_error(), Some(StorageError::Io { .. })));
        assert!(runner.session().pending_checkpoint().is_some());
    }
}
