//! Save stores: where checkpoints are written

use crate::storage::{PersistedRecord, SaveBook};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// Persistence for session progress
///
/// Implementations must serialize concurrent saves for the same entity so
/// that two sessions of one entity never lose each other's records.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Load every record stored for an entity. Missing data is an empty book.
    async fn load_book(&self, entity_type: &str, entity_name: &str)
    -> Result<SaveBook, StorageError>;

    /// Merge one checkpoint into the entity's records.
    async fn save_record(&self, record: &PersistedRecord) -> Result<(), StorageError>;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

type EntityKey = (String, String);

/// One mutex per save file, created on first use
#[derive(Debug, Default)]
struct FileLocks {
    locks: StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileLocks {
    fn get(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(path.to_path_buf()).or_default().clone()
    }
}

/// Simple file-based save store: one JSON file per entity
#[derive(Debug)]
pub struct JsonSaveStore {
    base_path: PathBuf,
    locks: FileLocks,
}

impl JsonSaveStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
            locks: FileLocks::default(),
        }
    }

    fn get_save_path(&self, entity_type: &str, entity_name: &str) -> PathBuf {
        self.base_path.join(format!(
            "{}__{}.save.json",
            encode_component(entity_type),
            encode_component(entity_name)
        ))
    }

    async fn read_book(&self, path: &Path) -> Result<SaveBook, StorageError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SaveBook::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    message: format!("Failed to read save file {}", path.display()),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| StorageError::Serialization {
            message: format!("Failed to deserialize save file {}", path.display()),
            source: e,
        })
    }
}

/// Percent-encode a name for use in a file name.
///
/// Only ASCII letters, digits and `-` pass through, so distinct names never
/// share a file and `__` only ever appears as the separator.
fn encode_component(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[async_trait]
impl SaveStore for JsonSaveStore {
    async fn load_book(
        &self,
        entity_type: &str,
        entity_name: &str,
    ) -> Result<SaveBook, StorageError> {
        let path = self.get_save_path(entity_type, entity_name);
        let lock = self.locks.get(&path);
        let _guard = lock.lock().await;
        self.read_book(&path).await
    }

    async fn save_record(&self, record: &PersistedRecord) -> Result<(), StorageError> {
        let entity_type = &record.global.entity_type;
        let entity_name = &record.global.entity_name;
        let path = self.get_save_path(entity_type, entity_name);

        let lock = self.locks.get(&path);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Io {
                message: format!("Failed to create save directory {}", self.base_path.display()),
                source: e,
            })?;

        let mut book = self.read_book(&path).await?;
        book.upsert(record.clone());

        let json = serde_json::to_string_pretty(&book).map_err(|e| StorageError::Serialization {
            message: "Failed to serialize save book".to_string(),
            source: e,
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StorageError::Io {
                message: format!("Failed to write save file {}", path.display()),
                source: e,
            })?;
        log::debug!(
            "[Storage] Saved {}/{}#{} to {}",
            entity_type,
            entity_name,
            record.local.uid,
            path.display()
        );
        Ok(())
    }
}

/// In-memory implementation for testing and embedding
#[derive(Debug, Default)]
pub struct InMemorySaveStore {
    books: Mutex<HashMap<EntityKey, SaveBook>>,
}

impl InMemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaveStore for InMemorySaveStore {
    async fn load_book(
        &self,
        entity_type: &str,
        entity_name: &str,
    ) -> Result<SaveBook, StorageError> {
        let books = self.books.lock().await;
        Ok(books
            .get(&(entity_type.to_string(), entity_name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_record(&self, record: &PersistedRecord) -> Result<(), StorageError> {
        let mut books = self.books.lock().await;
        books
            .entry((
                record.global.entity_type.clone(),
                record.global.entity_name.clone(),
            ))
            .or_default()
            .upsert(record.clone());
        Ok(())
    }
}
