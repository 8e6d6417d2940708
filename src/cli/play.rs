//! Terminal player mode for running scripts
//!
//! Plays one script interactively, saving progress to a directory so the
//! next run picks up where the player stopped.

use crate::{
    cli::view_state::{RenderDelta, ViewState, clear_screen, render_delta},
    config::EngineConfig,
    host::LocalHost,
    runner::{SessionRunner, Turn},
    script::Script,
    storage::JsonSaveStore,
    types::{
        action::ChoiceOption,
        output::Effect,
        state::{FinishReason, SessionIdentity, Status, Wait},
    },
};
use anyhow::Context;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Entity type used for sessions started from the terminal
pub const PLAYER_ENTITY_TYPE: &str = "script";
/// Uid of the terminal player
pub const PLAYER_UID: &str = "cli-player";

/// Options for [`run_play`]
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Show variables after every slice
    pub debug: bool,
    pub night: bool,
    pub save_dir: PathBuf,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            debug: false,
            night: false,
            save_dir: PathBuf::from("saves"),
        }
    }
}

/// What the player typed
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Continue,
    Choose(usize),
    Quit,
    Invalid,
}

fn parse_input(input: &str) -> Input {
    match input.trim() {
        "" => Input::Continue,
        "q" => Input::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Choose(n - 1),
            _ => Input::Invalid,
        },
    }
}

/// Run the player mode
pub async fn run_play(script_path: &Path, options: PlayOptions) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(script_path)
        .await
        .with_context(|| format!("Failed to read script '{}'", script_path.display()))?;
    let filename = script_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("script.json");
    let script = Script::from_json(&content, filename)?;

    let identity = SessionIdentity::new(PLAYER_ENTITY_TYPE, &script.name, PLAYER_UID, !options.night);
    let config = EngineConfig {
        pause_on_dialogue: true,
        ..EngineConfig::default()
    };
    let store = Arc::new(JsonSaveStore::new(&options.save_dir));
    let mut runner = SessionRunner::open(
        Arc::new(script.program()),
        identity,
        LocalHost::default(),
        config,
        store,
    )
    .await?;

    println!("=== {} ===", script.name);
    if !script.description.is_empty() {
        println!("{}", script.description);
    }
    println!();
    println!("Controls:");
    println!("  Enter: next");
    println!("  1-9:   select choice");
    println!("  q:     quit (progress is saved)");
    println!();
    if runner.session().counter() > 0 {
        println!("(resuming saved progress)");
        println!();
    }

    let mut view = ViewState::new();
    let mut turn = runner.start().await?;

    loop {
        // A pause means this slice just set its line, even if the text repeats
        if runner.session().status() == &Status::AwaitingInput(Wait::Continue) {
            view.forget_line();
        }
        show_turn(&turn, runner.session().dialogue_state(), &mut view);
        if options.debug {
            display_debug_info(&runner);
        }

        match runner.session().status().clone() {
            Status::AwaitingInput(Wait::Choice) => {
                let choices = runner.session().dialogue_state().choices.clone();
                clear_screen();
                show_choices(&choices);
                let Some(label) = read_choice(&choices)? else {
                    return quit(&mut runner).await;
                };
                turn = runner.submit_choice(&label).await?;
            }
            Status::AwaitingInput(Wait::Continue) => {
                if !wait_continue()? {
                    return quit(&mut runner).await;
                }
                turn = runner.advance().await?;
            }
            Status::Finished(FinishReason::IdleChatExhausted) => {
                println!("(nothing more to talk about)");
                return Ok(());
            }
            Status::Finished(_) => {
                println!();
                println!("== THE END ==");
                return Ok(());
            }
            Status::Aborted(err) => {
                return Err(err).context("Script aborted");
            }
            Status::Idle | Status::Running => {
                turn = runner.start().await?;
            }
        }
    }
}

async fn quit(runner: &mut SessionRunner<LocalHost>) -> anyhow::Result<()> {
    runner.stop().await?;
    println!("Progress saved. Goodbye!");
    Ok(())
}

fn show_turn(turn: &Turn, dialogue: &crate::types::dialogue::DialogueState, view: &mut ViewState) {
    let delta: RenderDelta = view.apply(dialogue);
    render_delta(&delta);

    if turn.output.has_effects() {
        for effect in &turn.output.effects {
            match effect {
                Effect::GiveItem { item, amount } => println!("[Received {amount} x {item}]"),
                Effect::Command { command } => println!("[Command: {command}]"),
                Effect::Checkpoint { .. } => {}
            }
        }
    }
    if let Some(err) = &turn.save_error {
        println!("[Warning: progress could not be saved: {err}]");
    }
}

fn show_choices(choices: &[ChoiceOption]) {
    println!("--- Choice ---");
    for (i, choice) in choices.iter().enumerate() {
        println!("{}. {}", i + 1, choice.text);
    }
    println!();
}

/// Read until a valid choice is picked. `None` means quit.
fn read_choice(choices: &[ChoiceOption]) -> io::Result<Option<String>> {
    loop {
        match parse_input(&get_input("Select:")?) {
            Input::Quit => return Ok(None),
            Input::Choose(index) if index < choices.len() => {
                return Ok(Some(choices[index].label.clone()));
            }
            _ => println!("Invalid choice. Enter 1-{} or 'q'.", choices.len()),
        }
    }
}

/// Wait for Enter. Returns false when the player quits.
fn wait_continue() -> io::Result<bool> {
    loop {
        match parse_input(&get_input("")?) {
            Input::Continue => return Ok(true),
            Input::Quit => return Ok(false),
            _ => println!("Press Enter to continue, or 'q' to quit."),
        }
    }
}

/// Display debug information (only when --debug is set)
fn display_debug_info(runner: &SessionRunner<LocalHost>) {
    let session = runner.session();
    println!("[debug]");
    println!("pc={}", session.counter());
    for (scope, vars) in [("local", session.locals()), ("global", session.globals())] {
        for (name, value) in vars.iter() {
            println!("{scope} {name}={value}");
        }
    }
    if !session.host().inventory.is_empty() {
        println!("inventory={:?}", session.host().inventory);
    }
    println!();
}

/// Get user input with an optional prompt
fn get_input(prompt: &str) -> io::Result<String> {
    if !prompt.is_empty() {
        print!("{} ", prompt);
        io::stdout().flush()?;
    }

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
