// Library interface for hangman
// This allows integration tests to access internal modules

pub mod cli;
pub mod error;
pub mod figure;
pub mod game_state;
pub mod logging;
pub mod scoring;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use error::{HangmanError, Result};
pub use figure::{HANGMAN_STAGES, figure_stage};
pub use game_state::{
    GameInterface, GameSession, GameStateMachine, GameView, GuessOutcome, Key, MAX_WRONG, Phase,
    RandomPicker, STARTING_LIVES, UserAction, WordPicker, game_loop,
};
pub use scoring::compute_score;
pub use wordbank::{
    Difficulty, EMBEDDED_WORDBANK, WordBank, WordEntry, load_wordbank_from_file,
    load_wordbank_from_str,
};
