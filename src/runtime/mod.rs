//! Runtime execution engine for dialogue programs
//!
//! [`step`] executes exactly one action and is a pure function of the state it
//! is given. [`run`] threads the state through `step` until the program
//! suspends or ends, and [`resume`] applies player input to a suspended state.

use crate::config::EngineConfig;
use crate::error::{EngineError, SessionError};
use crate::program::{Fetch, Program};
use crate::types::{
    action::{Action, ChoiceOption, Condition, Mutation},
    dialogue::SpriteState,
    event::Event,
    output::{Effect, Output, StepOutcome},
    state::{FinishReason, State, Status, VariableStore, Wait},
    value::Value,
};
use rand::{RngCore, SeedableRng, rngs::StdRng, seq::SliceRandom};

pub mod condition;
pub mod variables;


pub use condition::{evaluate, evaluate_condition};
pub use variables::{create, modify};

/// Result of executing one action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: State,
    pub outcome: StepOutcome,
    pub effects: Vec<Effect>,
}

/// How the program counter moves after an action
enum Flow {
    Next,
    Goto(usize),
    Await { wait: Wait, resume_at: usize },
    Finish(FinishReason),
}

/// Execute the action at the current program counter.
pub fn step(mut state: State, program: &Program, config: &EngineConfig) -> Transition {
    let mut effects = Vec::new();

    match state.status.clone() {
        Status::AwaitingInput(_) => return transition(state, StepOutcome::AwaitingInput, effects),
        Status::Finished(_) => return transition(state, StepOutcome::Finished, effects),
        Status::Aborted(err) => return transition(state, StepOutcome::Aborted(err), effects),
        Status::Idle | Status::Running => state.status = Status::Running,
    }

    let pc = state.pc;
    let flow = match program.at(pc) {
        Fetch::EndOfProgram => {
            log::info!("[Engine] Reached end of program at PC={pc}");
            Ok(Flow::Finish(FinishReason::EndOfScript))
        }
        Fetch::Malformed { tag, reason } => Err(EngineError::malformed(pc, tag, reason)),
        Fetch::Action(action) => {
            log::trace!("[Engine] Executing PC={pc} {}", action.tag());
            execute(&mut state, action, program, config, &mut effects)
        }
    };

    match flow {
        Ok(Flow::Next) => {
            state.pc += 1;
            transition(state, StepOutcome::Continue, effects)
        }
        Ok(Flow::Goto(target)) => {
            state.pc = target;
            transition(state, StepOutcome::Continue, effects)
        }
        Ok(Flow::Await { wait, resume_at }) => {
            state.pc = resume_at;
            state.status = Status::AwaitingInput(wait);
            transition(state, StepOutcome::AwaitingInput, effects)
        }
        Ok(Flow::Finish(reason)) => {
            log::debug!("[Engine] Finished at PC={pc}: {reason:?}");
            state.status = Status::Finished(reason);
            transition(state, StepOutcome::Finished, effects)
        }
        Err(err) => {
            log::error!("[Engine] Session aborted: {err}");
            state.status = Status::Aborted(err.clone());
            transition(state, StepOutcome::Aborted(err), effects)
        }
    }
}

fn transition(state: State, outcome: StepOutcome, effects: Vec<Effect>) -> Transition {
    Transition {
        state,
        outcome,
        effects,
    }
}

/// Run until the program suspends, finishes or aborts.
///
/// One-shot dialogue fields (sound, command) are cleared when a new slice
/// starts executing.
pub fn run(mut state: State, program: &Program, config: &EngineConfig) -> (State, Output) {
    let idle_outcome = match &state.status {
        Status::AwaitingInput(_) => Some(StepOutcome::AwaitingInput),
        Status::Finished(_) => Some(StepOutcome::Finished),
        Status::Aborted(err) => Some(StepOutcome::Aborted(err.clone())),
        Status::Idle | Status::Running => None,
    };
    if let Some(outcome) = idle_outcome {
        return (state, Output::new(outcome));
    }

    state.dialogue.clear_one_shots();
    let mut output = Output::new(StepOutcome::Continue);

    while output.steps < config.max_steps_per_run {
        let Transition {
            state: next,
            outcome,
            effects,
        } = step(state, program, config);
        state = next;
        output.steps += 1;
        output.effects.extend(effects);
        if !outcome.is_continue() {
            output.outcome = outcome;
            return (state, output);
        }
    }

    let err = EngineError::StepLimitExceeded {
        limit: config.max_steps_per_run,
    };
    log::error!("[Engine] Session aborted at PC={}: {err}", state.pc);
    state.status = Status::Aborted(err.clone());
    output.outcome = StepOutcome::Aborted(err);
    (state, output)
}

/// Apply player or host input to a suspended state.
///
/// A choice whose label does not resolve aborts the session; the error is
/// returned and the state is left `Aborted`.
pub fn resume(state: &mut State, program: &Program, event: &Event) -> Result<(), SessionError> {
    match event {
        Event::Choice { label } => {
            if state.status != Status::AwaitingInput(Wait::Choice) {
                return Err(SessionError::NotAwaitingChoice);
            }
            if !state.dialogue.choices.iter().any(|c| &c.label == label) {
                return Err(SessionError::UnknownChoice {
                    label: label.clone(),
                });
            }
            let Some(target) = program.resolve(label) else {
                let err = EngineError::unresolved_label(label, state.pc);
                log::error!("[Engine] Session aborted: {err}");
                state.status = Status::Aborted(err.clone());
                return Err(err.into());
            };
            log::debug!(
                "[Branch] Choice '{label}' selected, jumping from PC={} to PC={}",
                state.pc,
                target + 1
            );
            state.pc = target + 1;
            state.dialogue.choices.clear();
            state.status = Status::Running;
            Ok(())
        }
        Event::Continue => {
            if state.status != Status::AwaitingInput(Wait::Continue) {
                return Err(SessionError::NotAwaitingContinue);
            }
            state.status = Status::Running;
            Ok(())
        }
        Event::Stop => {
            if !state.status.is_terminal() {
                state.dialogue.choices.clear();
                state.status = Status::Finished(FinishReason::Stopped);
            }
            Ok(())
        }
    }
}

fn execute(
    state: &mut State,
    action: &Action,
    program: &Program,
    config: &EngineConfig,
    effects: &mut Vec<Effect>,
) -> Result<Flow, EngineError> {
    let pc = state.pc;

    match action {
        Action::Meta { action, var, init } => {
            let scope = match action.as_deref() {
                Some("create_var") => &mut state.locals,
                Some("create_global") => &mut state.globals,
                _ => return Ok(Flow::Next),
            };
            let Some(name) = var else {
                return Err(EngineError::malformed(pc, "meta", "missing field `var`"));
            };
            if variables::create(name, init, scope) {
                log::debug!("[Meta] Created {name}={init}");
            }
            Ok(Flow::Next)
        }
        Action::ShowSprite {
            sprite,
            location,
            position,
            layout,
        } => {
            state.dialogue.show_sprite(SpriteState {
                sprite: sprite.clone(),
                location: location.clone(),
                position: position
                    .clone()
                    .unwrap_or_else(|| SpriteState::DEFAULT_POSITION.to_string()),
                layout: layout.clone().unwrap_or_default(),
            });
            Ok(Flow::Next)
        }
        Action::RemoveSprite { sprite } => {
            state.dialogue.remove_sprite(sprite);
            Ok(Flow::Next)
        }
        Action::Dialogue {
            label,
            content,
            voice,
        } => {
            state
                .dialogue
                .set_line(label.clone(), content.clone(), voice.clone());
            if config.pause_on_dialogue {
                Ok(Flow::Await {
                    wait: Wait::Continue,
                    resume_at: pc + 1,
                })
            } else {
                Ok(Flow::Next)
            }
        }
        Action::ModifyVariable(mutation) => {
            apply_mutation(mutation, &mut state.locals, "local");
            Ok(Flow::Next)
        }
        Action::ModifyGlobal(mutation) => {
            apply_mutation(mutation, &mut state.globals, "global");
            Ok(Flow::Next)
        }
        Action::GiveItem { item, amount } => {
            effects.push(Effect::GiveItem {
                item: item.clone(),
                amount: *amount,
            });
            Ok(Flow::Next)
        }
        Action::Conditional(condition) => Ok(branch(condition, &state.locals, state.is_day, pc)),
        Action::ConditionalGlobal(condition) => {
            Ok(branch(condition, &state.globals, state.is_day, pc))
        }
        Action::Transition { action, label } => {
            if action != "jump" {
                return Ok(Flow::Next);
            }
            let Some(label) = label else {
                return Err(EngineError::malformed(pc, "transition", "missing field `label`"));
            };
            let target = jump_target(program, label, pc)?;
            log::debug!("[Jump] Jumping from PC={pc} to PC={target} (label={label})");
            Ok(Flow::Goto(target))
        }
        Action::Choice { choice } => {
            if choice.is_empty() {
                return Err(EngineError::malformed(pc, "choice", "choice list is empty"));
            }
            Ok(present_choices(state, choice))
        }
        Action::NightChoice { choice } => {
            if state.is_day || choice.is_empty() {
                Ok(Flow::Next)
            } else {
                Ok(present_choices(state, choice))
            }
        }
        Action::Command { command } => {
            state.dialogue.command = Some(command.clone());
            effects.push(Effect::Command {
                command: command.clone(),
            });
            Ok(Flow::Next)
        }
        Action::Label { .. } | Action::CheckInventory | Action::Unknown => Ok(Flow::Next),
        Action::ModifyBackground { background } => {
            state.dialogue.background = Some(background.clone());
            Ok(Flow::Next)
        }
        Action::ClearBackground => {
            state.dialogue.background = None;
            Ok(Flow::Next)
        }
        Action::UnlockDialogues { events } => {
            let mut unlocked = unlocked_events(&state.locals, &config.unlocked_events_var);
            for event in events {
                if !unlocked.contains(event) {
                    unlocked.push(event.clone());
                }
            }
            state
                .locals
                .set(config.unlocked_events_var.clone(), Value::List(unlocked));
            Ok(Flow::Next)
        }
        Action::PlaySound { sound } => {
            state.dialogue.sound = Some(sound.clone());
            Ok(Flow::Next)
        }
        Action::PlayMusic { music } => {
            state.dialogue.music = music.clone();
            Ok(Flow::Next)
        }
        Action::Next { label } => {
            let value = label.clone().map(Value::String).unwrap_or_default();
            state.locals.set(config.checkpoint_var.clone(), value);
            effects.push(Effect::Checkpoint {
                label: label.clone(),
            });
            Ok(Flow::Next)
        }
        Action::IdleChat => {
            let unlocked = unlocked_events(&state.locals, &config.unlocked_events_var);
            let mut rng = StdRng::seed_from_u64(state.rng_seed);
            let Some(chat) = unlocked.choose(&mut rng).cloned() else {
                return Ok(Flow::Finish(FinishReason::IdleChatExhausted));
            };
            state.rng_seed = rng.next_u64();
            let target = jump_target(program, &chat, pc)?;
            log::debug!("[IdleChat] Picked '{chat}', jumping from PC={pc} to PC={target}");
            Ok(Flow::Goto(target))
        }
        Action::FinishDialogue => Ok(Flow::Finish(FinishReason::FinishAction)),
    }
}

fn apply_mutation(mutation: &Mutation, scope: &mut VariableStore, scope_name: &str) {
    let Mutation { var, action, value } = mutation;
    match variables::modify(var, *action, value, scope) {
        Ok(()) => {
            let new_value = scope.get(var).cloned().unwrap_or_default();
            log::debug!("[Modify] {scope_name} {var} {action:?} {value} -> {new_value}");
        }
        Err(e) => log::warn!("[Modify] Ignoring {scope_name} mutation: {e}"),
    }
}

fn branch(condition: &Condition, scope: &VariableStore, is_day: bool, pc: usize) -> Flow {
    if evaluate_condition(condition, scope, is_day) {
        Flow::Next
    } else {
        log::debug!(
            "[Conditional] {:?} on {:?} is FALSE, jumping from PC={pc} to PC={}",
            condition.condition,
            condition.var,
            condition.end
        );
        Flow::Goto(condition.end)
    }
}

fn present_choices(state: &mut State, choices: &[ChoiceOption]) -> Flow {
    log::debug!(
        "[Branch] Presenting {} choices at PC={}",
        choices.len(),
        state.pc
    );
    state.dialogue.choices = choices.to_vec();
    Flow::Await {
        wait: Wait::Choice,
        resume_at: state.pc,
    }
}

/// Position just past the label, where execution continues after a jump.
fn jump_target(program: &Program, label: &str, pc: usize) -> Result<usize, EngineError> {
    program
        .resolve(label)
        .map(|position| position + 1)
        .ok_or_else(|| EngineError::unresolved_label(label, pc))
}

fn unlocked_events(locals: &VariableStore, name: &str) -> Vec<String> {
    match locals.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::List(items)) => items.clone(),
        Some(other) => {
            log::warn!(
                "[IdleChat] '{name}' holds a {}, expected a list",
                other.type_name()
            );
            Vec::new()
        }
    }
}
