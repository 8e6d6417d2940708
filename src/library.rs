//! Script library: every script found in a directory, keyed by uuid

use crate::script::Script;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Errors scanning the script directory itself
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Failed to read script directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file that could not be loaded. The scan keeps going.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: HashMap<String, Script>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir`.
    pub async fn load_dir<P: AsRef<Path>>(
        dir: P,
    ) -> Result<(Self, Vec<LoadFailure>), LibraryError> {
        let dir = dir.as_ref();
        let read_dir_error = |source| LibraryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        log::info!("[Library] Loading scripts from {}", dir.display());

        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        // Directory order is platform dependent
        paths.sort();

        let mut library = Self::new();
        let mut failures = Vec::new();
        for path in paths {
            let file = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();

            let loaded = match tokio::fs::read_to_string(&path).await {
                Ok(content) => Script::from_json(&content, &file).map_err(|e| e.to_string()),
                Err(e) => Err(format!("Failed to read {}: {e}", path.display())),
            };
            match loaded {
                Ok(script) => {
                    log::info!("[Library] Loaded script: {} (uuid: {})", script.name, script.id());
                    library.insert(script);
                }
                Err(reason) => {
                    log::warn!("[Library] Failed to load {file}: {reason}");
                    failures.push(LoadFailure { file, reason });
                }
            }
        }

        log::info!(
            "[Library] Finished loading scripts. Total: {}, failed: {}",
            library.len(),
            failures.len()
        );
        Ok((library, failures))
    }

    /// Add a script, replacing any script with the same uuid.
    pub fn insert(&mut self, script: Script) -> Option<Script> {
        let replaced = self.scripts.insert(script.id().to_string(), script);
        if let Some(old) = &replaced {
            log::warn!(
                "[Library] Duplicate uuid '{}': '{}' overwritten",
                old.id(),
                old.name
            );
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<&Script> {
        self.scripts.get(id)
    }

    /// Scripts whose trigger `key` is set to `value`, ordered by name.
    pub fn find_by_trigger(&self, key: &str, value: &str) -> Vec<&Script> {
        let mut found: Vec<&Script> = self
            .scripts
            .values()
            .filter(|script| script.trigger(key) == Some(value))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn script(name: &str, uuid: &str, trigger: Option<&str>) -> Script {
        let mut script = Script {
            name: name.to_string(),
            metadata: BTreeMap::from([("uuid".to_string(), uuid.to_string())]),
            ..Script::default()
        };
        if let Some(value) = trigger {
            script
                .triggers
                .insert("on_npc_interact".to_string(), value.to_string());
        }
        script
    }

    #[test]
    fn duplicate_uuid_overwrites() {
        let mut library = ScriptLibrary::new();
        assert!(library.insert(script("first", "same", None)).is_none());
        let replaced = library.insert(script("second", "same", None)).unwrap();

        assert_eq!(replaced.name, "first");
        assert_eq!(library.len(), 1);
        assert_eq!(library.get("same").unwrap().name, "second");
    }

    #[test]
    fn find_by_trigger_matches_value() {
        let mut library = ScriptLibrary::new();
        library.insert(script("b-villager", "1", Some("villager")));
        library.insert(script("a-villager", "2", Some("villager")));
        library.insert(script("guard", "3", Some("guard")));
        library.insert(script("silent", "4", None));

        let names: Vec<&str> = library
            .find_by_trigger("on_npc_interact", "villager")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["a-villager", "b-villager"]);
        assert!(library.find_by_trigger("on_enter", "villager").is_empty());
    }
}
