//! Action records that make up a dialogue program

use crate::types::value::Value;
use serde::{Deserialize, Serialize};

/// A single authored instruction, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Variable bookkeeping that is checked before the regular catalogue
    Meta {
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        var: Option<String>,
        #[serde(default)]
        init: Value,
    },
    ShowSprite {
        sprite: String,
        #[serde(default)]
        location: Option<String>,
        #[serde(default)]
        position: Option<String>,
        #[serde(default)]
        layout: Option<SpriteLayout>,
    },
    RemoveSprite {
        sprite: String,
    },
    Dialogue {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
    ModifyVariable(Mutation),
    ModifyGlobal(Mutation),
    GiveItem {
        item: String,
        amount: u32,
    },
    Conditional(Condition),
    ConditionalGlobal(Condition),
    Transition {
        action: String,
        #[serde(default)]
        label: Option<String>,
    },
    Choice {
        #[serde(default)]
        choice: Vec<ChoiceOption>,
    },
    NightChoice {
        #[serde(default)]
        choice: Vec<ChoiceOption>,
    },
    Command {
        command: String,
    },
    Label {
        #[serde(alias = "name")]
        label: String,
    },
    ModifyBackground {
        background: String,
    },
    ClearBackground,
    UnlockDialogues {
        events: Vec<String>,
    },
    PlaySound {
        sound: String,
    },
    PlayMusic {
        #[serde(default)]
        music: Option<String>,
    },
    Next {
        #[serde(default)]
        label: Option<String>,
    },
    IdleChat,
    FinishDialogue,
    CheckInventory,
    /// Any tag this engine does not know; executed as a no-op
    #[serde(other)]
    Unknown,
}

impl Action {
    /// The `type` discriminator this action was decoded from.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Meta { .. } => "meta",
            Action::ShowSprite { .. } => "show_sprite",
            Action::RemoveSprite { .. } => "remove_sprite",
            Action::Dialogue { .. } => "dialogue",
            Action::ModifyVariable(_) => "modify_variable",
            Action::ModifyGlobal(_) => "modify_global",
            Action::GiveItem { .. } => "give_item",
            Action::Conditional(_) => "conditional",
            Action::ConditionalGlobal(_) => "conditional_global",
            Action::Transition { .. } => "transition",
            Action::Choice { .. } => "choice",
            Action::NightChoice { .. } => "night_choice",
            Action::Command { .. } => "command",
            Action::Label { .. } => "label",
            Action::ModifyBackground { .. } => "modify_background",
            Action::ClearBackground => "clear_background",
            Action::UnlockDialogues { .. } => "unlock_dialogues",
            Action::PlaySound { .. } => "play_sound",
            Action::PlayMusic { .. } => "play_music",
            Action::Next { .. } => "next",
            Action::IdleChat => "idle_chat",
            Action::FinishDialogue => "finish_dialogue",
            Action::CheckInventory => "check_inventory",
            Action::Unknown => "unknown",
        }
    }

    /// Label name if this is a `label` marker.
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Action::Label { label } => Some(label),
            _ => None,
        }
    }
}

/// Payload of `modify_variable` / `modify_global`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub var: String,
    pub action: ModifyOp,
    #[serde(default)]
    pub value: Value,
}

/// Variable mutation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifyOp {
    Set,
    #[serde(alias = "increment")]
    Add,
    Append,
}

/// Payload of `conditional` / `conditional_global`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub var: Option<String>,
    pub condition: Predicate,
    #[serde(default)]
    pub value: Value,
    /// Position to continue from when the predicate does not hold
    pub end: usize,
}

/// Predicates understood by the condition evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    Day,
    Night,
}

/// One entry of a `choice` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Label jumped to when the player picks this option
    pub label: String,
    #[serde(alias = "content", default)]
    pub text: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Grid placement of a sprite on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteLayout {
    pub w_ratio: f64,
    pub h_ratio: f64,
    pub frame_w_ratio: f64,
    pub frame_h_ratio: f64,
    pub column: f64,
    /// First row is 1
    pub row: f64,
}

impl Default for SpriteLayout {
    fn default() -> Self {
        Self {
            w_ratio: 16.0,
            h_ratio: 9.0,
            frame_w_ratio: 4.0,
            frame_h_ratio: 8.0,
            column: 7.0,
            row: 1.0,
        }
    }
}
