//! Script container: one dialogue program plus its catalogue metadata

use crate::error::ScriptError;
use crate::program::Program;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CREATOR: &str = "unknown";
pub const DEFAULT_VERSION: &str = "0.0.1";

/// A script as stored on disk
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Trigger key to value, e.g. `on_npc_interact` to an entity type
    #[serde(default)]
    pub triggers: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub required_mods: Vec<String>,
    #[serde(default)]
    pub asset_dir: Option<String>,
    /// The ordered action records
    #[serde(default)]
    pub fsm: Vec<serde_json::Value>,
}

impl Script {
    /// Decode a script and fill in its defaults.
    pub fn from_json(content: &str, filename: &str) -> Result<Self, ScriptError> {
        let mut script: Script =
            serde_json::from_str(content).map_err(|source| ScriptError::InvalidJson {
                file: filename.to_string(),
                source,
            })?;
        script.post_load(filename);
        if script.id().is_empty() {
            return Err(ScriptError::MissingId {
                file: filename.to_string(),
            });
        }
        Ok(script)
    }

    /// Default the name from `filename`, ensure a uuid and default metadata.
    pub fn post_load(&mut self, filename: &str) {
        if self.name.is_empty() {
            self.name = filename
                .strip_suffix(".json")
                .unwrap_or(filename)
                .to_string();
        }

        let uuid = self.metadata.entry("uuid".to_string()).or_default();
        if uuid.is_empty() {
            *uuid = uuid::Uuid::new_v4().to_string();
            log::debug!("[Script] Generated uuid {uuid} for '{}'", self.name);
        }
        self.metadata
            .entry("creator".to_string())
            .or_insert_with(|| DEFAULT_CREATOR.to_string());
        self.metadata
            .entry("version".to_string())
            .or_insert_with(|| DEFAULT_VERSION.to_string());
    }

    pub fn id(&self) -> &str {
        self.metadata.get("uuid").map(String::as_str).unwrap_or("")
    }

    pub fn trigger(&self, key: &str) -> Option<&str> {
        self.triggers.get(key).map(String::as_str)
    }

    /// Load the action records into an executable program.
    pub fn program(&self) -> Program {
        Program::load(self.fsm.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_load_fills_defaults() {
        let script = Script::from_json(r#"{"fsm": []}"#, "greeting.json").unwrap();

        assert_eq!(script.name, "greeting");
        assert_eq!(script.description, "");
        assert!(script.triggers.is_empty());
        assert!(script.required_mods.is_empty());
        assert_eq!(script.asset_dir, None);
        assert!(uuid::Uuid::parse_str(script.id()).is_ok());
        assert_eq!(script.metadata["creator"], DEFAULT_CREATOR);
        assert_eq!(script.metadata["version"], DEFAULT_VERSION);
    }

    #[test]
    fn existing_metadata_is_kept() {
        let content = r#"{
            "name": "Shop",
            "triggers": {"on_npc_interact": "villager"},
            "metadata": {"uuid": "abc", "creator": "mira", "version": "2.1"},
            "required_mods": ["economy"],
            "asset_dir": "shop",
            "fsm": [
                {"type": "dialogue", "content": "Hi"},
                {"type": "label", "label": "end"}
            ]
        }"#;
        let script = Script::from_json(content, "shop.json").unwrap();

        assert_eq!(script.name, "Shop");
        assert_eq!(script.id(), "abc");
        assert_eq!(script.metadata["creator"], "mira");
        assert_eq!(script.metadata["version"], "2.1");
        assert_eq!(script.trigger("on_npc_interact"), Some("villager"));
        assert_eq!(script.required_mods, vec!["economy".to_string()]);
        assert_eq!(script.asset_dir.as_deref(), Some("shop"));

        let program = script.program();
        assert_eq!(program.len(), 2);
        assert_eq!(program.resolve("end"), Some(1));
    }

    #[test]
    fn empty_uuid_is_regenerated() {
        let script =
            Script::from_json(r#"{"metadata": {"uuid": ""}}"#, "a.json").unwrap();
        assert!(!script.id().is_empty());
    }

    #[test]
    fn invalid_json_names_the_file() {
        let err = Script::from_json("{ not json", "broken.json").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidJson { ref file, .. } if file == "broken.json"));
    }
}
