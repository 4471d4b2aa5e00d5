use crate::error::Result;
use crate::game_state::{GameInterface, GameView, Key, Phase, UserAction};
use crate::debug_log;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

/// Hangman in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a word bank file ("[category]" headers, "WORD | hint | difficulty" lines)
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<PathBuf>,

    /// Category for the first round
    #[arg(short = 'c', long = "category")]
    pub category: Option<String>,

    /// Seed for reproducible word selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Line-based interface instead of the full-screen one
    #[arg(long)]
    pub plain: bool,

    /// Write a log file to the default cache location
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Write a log file to this path (implies --verbose)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

const USAGE: &str = "Commands: a letter to guess | hint | sound | next (play again) | new (new game) | category <name> | exit";

pub enum LineInput {
    Action(UserAction),
    Invalid(String),
    Empty,
    Exit,
}

fn is_single_letter(input: &str) -> Option<char> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Interpret one line typed by the player.
pub fn parse_line(line: &str, phase: Phase) -> LineInput {
    let input = line.trim();
    if input.is_empty() {
        return LineInput::Empty;
    }

    if let Some(c) = is_single_letter(input) {
        return match UserAction::from_key(Key::Char(c), phase) {
            Some(action) => LineInput::Action(action),
            None => LineInput::Invalid(format!("Only letters are allowed! ('{c}' is not a letter)")),
        };
    }

    let lower = input.to_lowercase();
    let (command, argument) = match lower.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (lower.as_str(), ""),
    };

    match (command, argument) {
        ("exit" | "quit", _) => LineInput::Exit,
        ("help", _) => LineInput::Invalid(USAGE.to_string()),
        ("hint", "") => LineInput::Action(UserAction::ToggleHint),
        ("sound", "") => LineInput::Action(UserAction::ToggleSound),
        ("new", "") => LineInput::Action(UserAction::NewGame),
        ("next" | "again", "") if phase.is_round_over() => {
            LineInput::Action(UserAction::PlayAgain)
        }
        ("next" | "again", "") => LineInput::Invalid(
            "Finish the current round first, or type 'new' to restart.".to_string(),
        ),
        ("category" | "cat", "") => LineInput::Invalid("Usage: category <name>".to_string()),
        ("category" | "cat", name) => {
            LineInput::Action(UserAction::SelectCategory(name.to_string()))
        }
        _ => LineInput::Invalid(format!("Unrecognised input '{input}'. {USAGE}")),
    }
}

pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut input = String::new();
    let bytes = reader.read_line(&mut input)?;
    Ok((bytes > 0).then_some(input))
}

pub fn display_state(view: &GameView) {
    println!();
    if !view.figure.is_empty() {
        println!("{}", view.figure);
    }
    println!(
        "Score: {} | Lives: {} | Sound: {} | Category: {}",
        view.score,
        view.lives,
        if view.sound_enabled { "on" } else { "off" },
        view.category
    );
    println!("Word:  {}", view.masked_word);
    if view.hint_visible {
        println!("Hint:  {}", view.hint);
    }
    println!(
        "Wrong guesses: {}/{} | Letters found: {}/{}",
        view.wrong_count, view.max_wrong, view.correct_count, view.distinct_letters
    );
    println!("Wrong letters: {}", format_letters(&view.wrong_letters));
}

pub fn display_round_over(view: &GameView) {
    let word = view.revealed_word.as_deref().unwrap_or_default();
    if view.phase == Phase::Won {
        println!("\nCongratulations! You guessed the word: {word}");
    } else {
        println!("\nGame Over! The word was: {word}");
    }
    println!("Final Score: {}", view.score);
    println!("Type 'next' to play again or 'new' for a new game.");
    println!("Categories: {}", view.categories.join(", "));
}

pub fn display_message(message: &str) {
    println!("{message}");
}

pub fn display_exit_message() {
    println!("Exiting.");
}

#[must_use]
pub fn format_letters(letters: &[char]) -> String {
    if letters.is_empty() {
        "None".to_string()
    } else {
        letters
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// CLI implementation of the `GameInterface` trait
/// This struct wraps a `BufRead` reader and reads one command per line
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_state(&mut self, view: &GameView) {
        display_state(view);
    }

    fn display_round_over(&mut self, view: &GameView) {
        display_round_over(view);
    }

    fn display_message(&mut self, message: &str) {
        display_message(message);
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }

    fn read_action(&mut self, view: &GameView) -> Option<UserAction> {
        println!("\nEnter a letter (or a command, 'help' lists them):");
        let line = match read_line(&mut self.reader) {
            Ok(Some(line)) => line,
            Ok(None) => return Some(UserAction::Exit),
            Err(e) => {
                log::warn!("Failed to read input: {e}");
                return Some(UserAction::Exit);
            }
        };

        match parse_line(&line, view.phase) {
            LineInput::Action(action) => Some(action),
            LineInput::Exit => Some(UserAction::Exit),
            LineInput::Empty => UserAction::from_key(Key::Enter, view.phase),
            LineInput::Invalid(message) => {
                debug_log!("read_action() - rejected input {:?}", line.trim());
                display_message(&message);
                None
            }
        }
    }
}
