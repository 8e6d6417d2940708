//! Host collaborators that carry out engine side effects

use crate::config::CommandPolicy;
use crate::types::output::Effect;
use std::collections::BTreeMap;

/// The game or server a session runs inside.
///
/// The engine only names the item or passes the literal command; permission
/// checks and rate limits belong to the implementation.
pub trait Host {
    fn give_item(&mut self, item: &str, amount: u32);

    /// Returns whether the command was executed.
    fn run_command(&mut self, command: &str) -> bool;
}

/// Dispatch the host-facing effects of one run.
pub fn apply_effects<H: Host + ?Sized>(host: &mut H, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::GiveItem { item, amount } => host.give_item(item, *amount),
            Effect::Command { command } => {
                if !host.run_command(command) {
                    log::warn!("[Host] Command refused: {command}");
                }
            }
            Effect::Checkpoint { .. } => {}
        }
    }
}

/// Host that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {
    fn give_item(&mut self, _item: &str, _amount: u32) {}

    fn run_command(&mut self, _command: &str) -> bool {
        false
    }
}

/// Self-contained host with an in-memory inventory.
///
/// Commands that pass the policy are recorded instead of executed.
#[derive(Debug, Default, Clone)]
pub struct LocalHost {
    pub inventory: BTreeMap<String, u64>,
    pub policy: CommandPolicy,
    pub executed: Vec<String>,
}

impl LocalHost {
    pub fn new(policy: CommandPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn count(&self, item: &str) -> u64 {
        self.inventory.get(item).copied().unwrap_or(0)
    }
}

impl Host for LocalHost {
    fn give_item(&mut self, item: &str, amount: u32) {
        let slot = self.inventory.entry(item.to_string()).or_insert(0);
        *slot = slot.saturating_add(u64::from(amount));
    }

    fn run_command(&mut self, command: &str) -> bool {
        if !self.policy.allows(command) {
            return false;
        }
        self.executed.push(command.to_string());
        true
    }
}
