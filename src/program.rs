//! Loaded dialogue programs and label resolution

use crate::types::action::Action;
use std::collections::HashMap;

/// One position in a program.
///
/// Records that fail to decode are kept in place so that positions stay
/// stable; the failure surfaces when the counter reaches them.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Action(Action),
    Malformed { tag: String, reason: String },
}

/// What lives at a program position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fetch<'a> {
    Action(&'a Action),
    Malformed { tag: &'a str, reason: &'a str },
    EndOfProgram,
}

/// An immutable, indexed sequence of actions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    slots: Vec<Slot>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Decode raw action records and index their labels.
    pub fn load(records: Vec<serde_json::Value>) -> Self {
        let slots = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let tag = record
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<missing>")
                    .to_string();
                match serde_json::from_value::<Action>(record) {
                    Ok(action) => Slot::Action(action),
                    Err(e) => {
                        log::warn!("[Program] Action at position {position} ('{tag}') is malformed: {e}");
                        Slot::Malformed {
                            tag,
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .collect();
        Self::index(slots)
    }

    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self::index(actions.into_iter().map(Slot::Action).collect())
    }

    fn index(slots: Vec<Slot>) -> Self {
        let mut labels = HashMap::new();
        for (position, slot) in slots.iter().enumerate() {
            let Slot::Action(action) = slot else {
                continue;
            };
            if let Some(name) = action.label_name()
                && let Some(previous) = labels.insert(name.to_string(), position)
            {
                // Last definition wins
                log::debug!("[Program] Label '{name}' at {previous} redefined at {position}");
            }
        }
        Self { slots, labels }
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    pub fn at(&self, position: usize) -> Fetch<'_> {
        match self.slots.get(position) {
            Some(Slot::Action(action)) => Fetch::Action(action),
            Some(Slot::Malformed { tag, reason }) => Fetch::Malformed { tag, reason },
            None => Fetch::EndOfProgram,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct label names
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}
