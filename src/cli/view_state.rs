//! View state management for the terminal player
//!
//! Tracks what is already on screen and computes rendering deltas from the
//! engine's dialogue state so that only changes are printed.

use crate::types::dialogue::{DialogueState, SpriteState};
use std::collections::BTreeMap;

/// Clear the terminal screen (cross-platform)
pub fn clear_screen() {
    print!("\x1b[2J\x1b[H");

    // Fallback: print newlines
    if std::io::Write::flush(&mut std::io::stdout()).is_err() {
        for _ in 0..50 {
            println!();
        }
    }
}

/// What the player currently sees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub background: Option<String>,
    /// Sprite id -> displayed sprite
    pub sprites: BTreeMap<String, SpriteState>,
    pub music: Option<String>,
    /// Last line shown, so unchanged lines are not repeated
    pub line: Option<(Option<String>, String)>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from the latest dialogue state and return what changed.
    pub fn apply(&mut self, dialogue: &DialogueState) -> RenderDelta {
        let mut delta = RenderDelta::default();

        if dialogue.background != self.background {
            delta.effects_added.push(match &dialogue.background {
                Some(background) => format!("Background: {background}"),
                None => "ClearBackground".to_string(),
            });
            self.background = dialogue.background.clone();
        }

        let current: BTreeMap<String, SpriteState> = dialogue
            .sprites
            .iter()
            .map(|s| (s.sprite.clone(), s.clone()))
            .collect();
        for (id, sprite) in &current {
            if self.sprites.get(id) != Some(sprite) {
                let asset = sprite.location.as_deref().unwrap_or(&sprite.sprite);
                delta
                    .effects_added
                    .push(format!("ShowSprite: {asset} ({})", sprite.position));
            }
        }
        for id in self.sprites.keys() {
            if !current.contains_key(id) {
                delta.effects_added.push(format!("RemoveSprite: {id}"));
            }
        }
        self.sprites = current;

        if dialogue.music != self.music {
            delta.effects_added.push(match &dialogue.music {
                Some(music) => format!("PlayMusic: {music}"),
                None => "StopMusic".to_string(),
            });
            self.music = dialogue.music.clone();
        }

        // One-shot: always reported
        if let Some(sound) = &dialogue.sound {
            delta.effects_added.push(format!("PlaySound: {sound}"));
        }

        if let Some(content) = &dialogue.content {
            let line = (dialogue.label.clone(), content.clone());
            if self.line.as_ref() != Some(&line) {
                delta.line = Some(line.clone());
                self.line = Some(line);
            }
        }

        delta
    }

    /// Forget the last line so the next apply shows it even if unchanged.
    pub fn forget_line(&mut self) {
        self.line = None;
    }
}

/// What needs to be rendered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDelta {
    /// Human-readable presentation changes
    pub effects_added: Vec<String>,
    /// New speaker and line, if the line changed
    pub line: Option<(Option<String>, String)>,
}

impl RenderDelta {
    pub fn is_empty(&self) -> bool {
        self.effects_added.is_empty() && self.line.is_none()
    }
}

/// Print a rendering delta
pub fn render_delta(delta: &RenderDelta) {
    for effect in &delta.effects_added {
        println!("[{effect}]");
    }
    if let Some((speaker, text)) = &delta.line {
        if let Some(speaker) = speaker {
            println!("{speaker}:");
        }
        println!("{text}");
        println!();
    }
}
