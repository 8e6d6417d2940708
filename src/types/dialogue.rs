//! The on-screen snapshot read by the presentation layer

use crate::types::action::{ChoiceOption, SpriteLayout};
use serde::{Deserialize, Serialize};

/// Everything visible on screen at the current point of the script.
///
/// Only the dispatcher writes to this; hosts read it after each run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogueState {
    /// Speaker label of the current line
    pub label: Option<String>,
    pub content: Option<String>,
    pub voice: Option<String>,
    pub background: Option<String>,
    /// Last command issued; cleared at the start of every run
    pub command: Option<String>,
    /// Sticky until replaced or stopped
    pub music: Option<String>,
    /// Cleared at the start of every run
    pub sound: Option<String>,
    pub sprites: Vec<SpriteState>,
    /// Choices waiting for the player, empty once answered
    pub choices: Vec<ChoiceOption>,
}

impl DialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty content never overwrites the previous line.
    pub fn set_line(&mut self, label: Option<String>, content: Option<String>, voice: Option<String>) {
        self.label = label;
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            self.content = Some(content);
        }
        self.voice = voice;
    }

    /// Show a sprite, replacing an existing one with the same id in place.
    pub fn show_sprite(&mut self, sprite: SpriteState) {
        match self.sprites.iter_mut().find(|s| s.sprite == sprite.sprite) {
            Some(existing) => *existing = sprite,
            None => self.sprites.push(sprite),
        }
    }

    pub fn remove_sprite(&mut self, sprite: &str) -> bool {
        let before = self.sprites.len();
        self.sprites.retain(|s| s.sprite != sprite);
        self.sprites.len() != before
    }

    pub(crate) fn clear_one_shots(&mut self) {
        self.command = None;
        self.sound = None;
    }
}

/// A sprite currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteState {
    /// Sprite id (asset folder)
    pub sprite: String,
    pub location: Option<String>,
    pub position: String,
    pub layout: SpriteLayout,
}

impl SpriteState {
    pub const DEFAULT_POSITION: &'static str = "CENTER";

    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            location: None,
            position: Self::DEFAULT_POSITION.to_string(),
            layout: SpriteLayout::default(),
        }
    }
}
