//! Hangman session state machine and the loop that drives it.
//!
//! # Phases
//! `Idle` → `InProgress` → `Won` | `Lost`. A finished round stays in its
//! terminal phase until [`GameStateMachine::start_round`] is called again.
//!
//! Invalid requests (repeat guesses, guesses outside a round, category
//! changes mid-round) are absorbed without error. The mutating operations
//! report whether anything changed so callers can tell the difference.

use crate::error::{HangmanError, Result};
use crate::figure::figure_stage;
use crate::scoring::compute_score;
use crate::wordbank::{Difficulty, WordBank};
use crate::{debug_log, info_log};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

pub const MAX_WRONG: u32 = 6;
pub const STARTING_LIVES: u32 = 3;
pub const PLACEHOLDER: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InProgress,
    Won,
    Lost,
}

impl Phase {
    #[must_use]
    pub fn is_round_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Everything the session remembers between operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub category: String,
    pub word: String,
    pub hint: String,
    pub difficulty: Difficulty,
    /// Letters tried this round, in the order they were guessed.
    pub guessed_letters: Vec<char>,
    pub wrong_count: u32,
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub hint_visible: bool,
    pub sound_enabled: bool,
}

impl GameSession {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            word: String::new(),
            hint: String::new(),
            difficulty: Difficulty::Medium,
            guessed_letters: Vec::new(),
            wrong_count: 0,
            phase: Phase::Idle,
            score: 0,
            lives: STARTING_LIVES,
            hint_visible: false,
            sound_enabled: true,
        }
    }

    fn is_guessed(&self, letter: char) -> bool {
        self.guessed_letters.contains(&letter)
    }
}

/// Result of a single letter guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Not a letter, already guessed, or no round in progress.
    Ignored,
    Hit,
    Miss,
    Won { points: u32 },
    Lost,
}

/// Chooses which entry of a category becomes the next word.
pub trait WordPicker {
    /// Index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<F: FnMut(usize) -> usize> WordPicker for F {
    fn pick(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// Uniform picker backed by `StdRng`.
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WordPicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

type Listener = Box<dyn FnMut(&GameSession)>;

/// Owned snapshot of what a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub phase: Phase,
    pub category: String,
    pub categories: Vec<String>,
    pub masked_word: String,
    /// The answer, only once the round is over.
    pub revealed_word: Option<String>,
    pub hint: String,
    pub hint_visible: bool,
    pub difficulty: Difficulty,
    pub guessed_letters: Vec<char>,
    pub wrong_letters: Vec<char>,
    pub correct_count: usize,
    pub distinct_letters: usize,
    pub wrong_count: u32,
    pub max_wrong: u32,
    pub score: u32,
    pub lives: u32,
    pub sound_enabled: bool,
    pub figure: &'static str,
}

impl GameView {
    #[must_use]
    pub fn is_wrong(&self, letter: char) -> bool {
        self.wrong_letters.contains(&letter)
    }

    #[must_use]
    pub fn is_guessed(&self, letter: char) -> bool {
        self.guessed_letters.contains(&letter)
    }
}

pub struct GameStateMachine {
    bank: WordBank,
    session: GameSession,
    picker: Box<dyn WordPicker>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for GameStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStateMachine")
            .field("session", &self.session)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl GameStateMachine {
    /// New session on the first category of `bank`, words drawn at random.
    #[must_use]
    pub fn new(bank: WordBank) -> Self {
        Self::with_picker(bank, RandomPicker::from_entropy())
    }

    #[must_use]
    pub fn with_picker(bank: WordBank, picker: impl WordPicker + 'static) -> Self {
        let session = GameSession::new(bank.first_category());
        Self {
            bank,
            session,
            picker: Box::new(picker),
            listeners: Vec::new(),
        }
    }

    /// Register a callback run after every operation that changed the session.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameSession) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.session);
        }
    }

    /// Choose the category for the next round.
    ///
    /// Unknown names are an error. Returns `Ok(false)` without changing
    /// anything while a round is in progress.
    pub fn select_category(&mut self, category: &str) -> Result<bool> {
        if !self.bank.contains(category) {
            return Err(HangmanError::UnknownCategory(category.to_string()));
        }
        if self.session.phase == Phase::InProgress {
            debug_log!("select_category('{}') ignored: round in progress", category);
            return Ok(false);
        }
        if self.session.category != category {
            info_log!("Category changed: {} -> {}", self.session.category, category);
            self.session.category = category.to_string();
            self.notify();
        }
        Ok(true)
    }

    /// Draw a new word from the current category and begin a round.
    pub fn start_round(&mut self) -> Result<()> {
        let entries = self.bank.words_for(&self.session.category)?;
        let index = self.picker.pick(entries.len()).min(entries.len() - 1);
        let entry = &entries[index];

        self.session.word.clone_from(&entry.word);
        self.session.hint.clone_from(&entry.hint);
        self.session.difficulty = entry.difficulty;
        self.session.guessed_letters.clear();
        self.session.wrong_count = 0;
        self.session.phase = Phase::InProgress;
        self.session.hint_visible = false;

        info_log!(
            "Round started: category={}, length={}, difficulty={}",
            self.session.category,
            self.session.word.len(),
            self.session.difficulty
        );
        self.notify();
        Ok(())
    }

    /// Reset score and lives, then start a round.
    pub fn start_new_session(&mut self) -> Result<()> {
        info_log!("New session (previous score {})", self.session.score);
        self.session.score = 0;
        self.session.lives = STARTING_LIVES;
        self.start_round()
    }

    pub fn guess_letter(&mut self, input: char) -> GuessOutcome {
        if !input.is_ascii_alphabetic() {
            debug_log!("guess_letter({:?}) ignored: not a letter", input);
            return GuessOutcome::Ignored;
        }
        let letter = input.to_ascii_uppercase();
        if self.session.phase != Phase::InProgress {
            debug_log!("guess_letter('{}') ignored: phase {:?}", letter, self.session.phase);
            return GuessOutcome::Ignored;
        }
        if self.session.is_guessed(letter) {
            debug_log!("guess_letter('{}') ignored: already guessed", letter);
            return GuessOutcome::Ignored;
        }

        self.session.guessed_letters.push(letter);

        let outcome = if self.session.word.contains(letter) {
            if self.is_word_complete() {
                let points =
                    compute_score(&self.session.word, self.session.wrong_count, MAX_WRONG);
                self.session.score += points;
                self.session.phase = Phase::Won;
                info_log!("Round won: +{} points, score {}", points, self.session.score);
                GuessOutcome::Won { points }
            } else {
                GuessOutcome::Hit
            }
        } else {
            self.session.wrong_count += 1;
            if self.session.wrong_count >= MAX_WRONG {
                self.session.phase = Phase::Lost;
                self.session.lives = self.session.lives.saturating_sub(1);
                info_log!("Round lost: lives left {}", self.session.lives);
                GuessOutcome::Lost
            } else {
                GuessOutcome::Miss
            }
        };

        self.notify();
        outcome
    }

    pub fn toggle_hint(&mut self) -> bool {
        self.session.hint_visible = !self.session.hint_visible;
        self.notify();
        self.session.hint_visible
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.session.sound_enabled = !self.session.sound_enabled;
        self.notify();
        self.session.sound_enabled
    }

    fn is_word_complete(&self) -> bool {
        self.session.word.chars().all(|c| self.session.is_guessed(c))
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.bank.categories()
    }

    /// Word with unguessed letters replaced by `_`, letters space-separated.
    #[must_use]
    pub fn masked_word(&self) -> String {
        self.session
            .word
            .chars()
            .map(|c| if self.session.is_guessed(c) { c } else { PLACEHOLDER })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn wrong_letters(&self) -> Vec<char> {
        self.session
            .guessed_letters
            .iter()
            .copied()
            .filter(|&c| !self.session.word.contains(c))
            .collect()
    }

    #[must_use]
    pub fn correct_letters(&self) -> Vec<char> {
        self.session
            .guessed_letters
            .iter()
            .copied()
            .filter(|&c| self.session.word.contains(c))
            .collect()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_letters().len()
    }

    #[must_use]
    pub fn distinct_letter_count(&self) -> usize {
        let mut seen: Vec<char> = self.session.word.chars().collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    #[must_use]
    pub fn figure(&self) -> &'static str {
        figure_stage(self.session.wrong_count)
    }

    #[must_use]
    pub fn view(&self) -> GameView {
        let session = &self.session;
        GameView {
            phase: session.phase,
            category: session.category.clone(),
            categories: self.bank.categories().into_iter().map(String::from).collect(),
            masked_word: self.masked_word(),
            revealed_word: session.phase.is_round_over().then(|| session.word.clone()),
            hint: session.hint.clone(),
            hint_visible: session.hint_visible,
            difficulty: session.difficulty,
            guessed_letters: session.guessed_letters.clone(),
            wrong_letters: self.wrong_letters(),
            correct_count: self.correct_count(),
            distinct_letters: self.distinct_letter_count(),
            wrong_count: session.wrong_count,
            max_wrong: MAX_WRONG,
            score: session.score,
            lives: session.lives,
            sound_enabled: session.sound_enabled,
            figure: self.figure(),
        }
    }
}

/// Key presses the core knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(char),
    SelectCategory(String),
    PlayAgain,
    NewGame,
    ToggleHint,
    ToggleSound,
    Exit,
}

impl UserAction {
    /// Map a raw key to an action.
    ///
    /// Letters guess while a round is running; outside a round `H` shows or
    /// hides the hint instead. Enter replays a finished round.
    #[must_use]
    pub fn from_key(key: Key, phase: Phase) -> Option<Self> {
        match key {
            Key::Char(c) if c.is_ascii_alphabetic() => {
                if phase != Phase::InProgress && c.eq_ignore_ascii_case(&'h') {
                    Some(Self::ToggleHint)
                } else {
                    Some(Self::Guess(c.to_ascii_uppercase()))
                }
            }
            Key::Enter if phase.is_round_over() => Some(Self::PlayAgain),
            Key::Esc => Some(Self::Exit),
            Key::Char(_) | Key::Enter => None,
        }
    }
}

/// A front-end able to show the game and collect player actions.
pub trait GameInterface {
    fn display_state(&mut self, view: &GameView);
    fn display_round_over(&mut self, view: &GameView);
    fn display_message(&mut self, message: &str);
    fn display_exit_message(&mut self);
    /// `None` when the input produced nothing to act on.
    fn read_action(&mut self, view: &GameView) -> Option<UserAction>;
}

/// Play until the interface asks to exit. The first round starts immediately.
pub fn game_loop<I: GameInterface + ?Sized>(
    machine: &mut GameStateMachine,
    interface: &mut I,
) -> Result<()> {
    machine.start_round()?;

    loop {
        let view = machine.view();
        interface.display_state(&view);

        let Some(action) = interface.read_action(&view) else {
            continue;
        };
        debug_log!("game_loop() - action {:?}", action);

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::Guess(letter) => match machine.guess_letter(letter) {
                GuessOutcome::Won { .. } | GuessOutcome::Lost => {
                    interface.display_round_over(&machine.view());
                }
                GuessOutcome::Ignored if view.is_guessed(letter.to_ascii_uppercase()) => {
                    interface.display_message(&format!(
                        "You already tried '{}'.",
                        letter.to_ascii_uppercase()
                    ));
                }
                _ => {}
            },
            UserAction::PlayAgain => machine.start_round()?,
            UserAction::NewGame => machine.start_new_session()?,
            UserAction::SelectCategory(name) => match machine.select_category(&name) {
                Ok(true) => interface.display_message(&format!(
                    "Category set to '{name}'. It applies from the next round."
                )),
                Ok(false) => interface
                    .display_message("Finish the current round before changing category."),
                Err(e) => {
                    log::warn!("Category selection failed: {e}");
                    interface.display_message(&e.to_string());
                }
            },
            UserAction::ToggleHint => {
                machine.toggle_hint();
            }
            UserAction::ToggleSound => {
                machine.toggle_sound();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HangmanError;
    use crate::wordbank::load_wordbank_from_str;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ANIMALS_PENGUIN: usize = 2;
    const TECHNOLOGY_COMPUTER: usize = 1;

    fn fixed(index: usize) -> impl FnMut(usize) -> usize {
        move |_| index
    }

    fn embedded_machine(index: usize) -> GameStateMachine {
        GameStateMachine::with_picker(WordBank::embedded().unwrap(), fixed(index))
    }

    fn small_machine() -> GameStateMachine {
        let bank = load_wordbank_from_str(
            "[pets]\nCAT | Says meow | easy\n[long]\nELEPHANT | Trunk | medium\n",
        )
        .unwrap();
        GameStateMachine::with_picker(bank, fixed(0))
    }

    fn lose_round(machine: &mut GameStateMachine) {
        let mut misses = 0;
        for letter in 'A'..='Z' {
            if misses == MAX_WRONG {
                break;
            }
            if !machine.session().word.contains(letter) {
                machine.guess_letter(letter);
                misses += 1;
            }
        }
        assert_eq!(machine.phase(), Phase::Lost);
    }

    #[test]
    fn test_new_machine_is_idle() {
        let machine = embedded_machine(0);
        let session = machine.session();
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.category, "animals");
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, STARTING_LIVES);
        assert!(session.sound_enabled);
        assert!(!session.hint_visible);
    }

    #[test]
    fn test_start_round_draws_from_category() {
        let bank = WordBank::embedded().unwrap();
        for category in bank.categories() {
            let words: Vec<String> = bank
                .words_for(category)
                .unwrap()
                .iter()
                .map(|e| e.word.clone())
                .collect();
            let mut machine = GameStateMachine::with_picker(bank.clone(), RandomPicker::seeded(7));
            machine.select_category(category).unwrap();
            for _ in 0..20 {
                machine.start_round().unwrap();
                assert!(words.contains(&machine.session().word));
                assert_eq!(machine.phase(), Phase::InProgress);
            }
        }
    }

    #[test]
    fn test_start_round_sets_word_and_hint() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();
        let session = machine.session();
        assert_eq!(session.word, "PENGUIN");
        assert_eq!(session.hint, "Black and white bird that cannot fly");
        assert_eq!(session.difficulty, Difficulty::Medium);
        assert!(session.guessed_letters.is_empty());
        assert_eq!(session.wrong_count, 0);
    }

    #[test]
    fn test_out_of_range_pick_is_clamped() {
        let mut machine = embedded_machine(99);
        machine.start_round().unwrap();
        assert_eq!(machine.session().word, "OCTOPUS");
    }

    #[test]
    fn test_penguin_win_scenario() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();

        for letter in ['P', 'E', 'N', 'G', 'U'] {
            assert_eq!(machine.guess_letter(letter), GuessOutcome::Hit);
        }
        assert_eq!(machine.guess_letter('I'), GuessOutcome::Won { points: 160 });

        let session = machine.session();
        assert_eq!(session.phase, Phase::Won);
        assert_eq!(session.wrong_count, 0);
        assert_eq!(session.score, 160);
        assert_eq!(session.lives, STARTING_LIVES);
    }

    #[test]
    fn test_computer_loss_scenario() {
        let mut machine = embedded_machine(TECHNOLOGY_COMPUTER);
        machine.select_category("technology").unwrap();
        machine.start_round().unwrap();
        assert_eq!(machine.session().word, "COMPUTER");

        for letter in ['Q', 'X', 'Z', 'J', 'V'] {
            assert_eq!(machine.guess_letter(letter), GuessOutcome::Miss);
            assert_eq!(machine.phase(), Phase::InProgress);
        }
        assert_eq!(machine.guess_letter('K'), GuessOutcome::Lost);

        let session = machine.session();
        assert_eq!(session.phase, Phase::Lost);
        assert_eq!(session.wrong_count, MAX_WRONG);
        assert_eq!(session.lives, STARTING_LIVES - 1);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_repeat_guess_changes_nothing() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();

        machine.guess_letter('Z');
        let before = machine.session().clone();
        assert_eq!(machine.guess_letter('Z'), GuessOutcome::Ignored);
        assert_eq!(machine.guess_letter('z'), GuessOutcome::Ignored);
        assert_eq!(machine.session(), &before);

        machine.guess_letter('P');
        let before = machine.session().clone();
        assert_eq!(machine.guess_letter('p'), GuessOutcome::Ignored);
        assert_eq!(machine.session(), &before);
    }

    #[test]
    fn test_non_letters_ignored() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();
        let before = machine.session().clone();
        for input in ['1', ' ', '-', 'é', '\n'] {
            assert_eq!(machine.guess_letter(input), GuessOutcome::Ignored);
        }
        assert_eq!(machine.session(), &before);
    }

    #[test]
    fn test_lowercase_guess_normalized() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();
        assert_eq!(machine.guess_letter('p'), GuessOutcome::Hit);
        assert_eq!(machine.session().guessed_letters, vec!['P']);
    }

    #[test]
    fn test_guess_outside_round_ignored() {
        let mut machine = embedded_machine(0);
        assert_eq!(machine.guess_letter('E'), GuessOutcome::Ignored);
        assert!(machine.session().guessed_letters.is_empty());

        machine.start_round().unwrap();
        lose_round(&mut machine);
        let before = machine.session().clone();
        assert_eq!(machine.guess_letter('E'), GuessOutcome::Ignored);
        assert_eq!(machine.session(), &before);
    }

    #[test]
    fn test_wrong_count_and_guesses_monotonic() {
        let mut machine = embedded_machine(0);
        machine.start_round().unwrap();
        let mut last_wrong = 0;
        let mut last_guessed = 0;
        for letter in "QEZLXPBHAJNT".chars() {
            machine.guess_letter(letter);
            let session = machine.session();
            assert!(session.wrong_count >= last_wrong);
            assert!(session.guessed_letters.len() >= last_guessed);
            last_wrong = session.wrong_count;
            last_guessed = session.guessed_letters.len();
        }
    }

    #[test]
    fn test_win_requires_every_distinct_letter() {
        let mut machine = small_machine();
        machine.start_round().unwrap();
        machine.guess_letter('C');
        machine.guess_letter('A');
        assert_eq!(machine.phase(), Phase::InProgress);
        assert_eq!(machine.correct_count(), 2);
        assert_eq!(machine.distinct_letter_count(), 3);
        machine.guess_letter('T');
        assert_eq!(machine.phase(), Phase::Won);
    }

    #[test]
    fn test_win_with_misses_scores_bonus() {
        let mut machine = small_machine();
        machine.start_round().unwrap();
        for letter in ['Q', 'Z', 'C', 'A'] {
            machine.guess_letter(letter);
        }
        // Two misses on CAT: 100 + 4 * 10
        assert_eq!(machine.guess_letter('T'), GuessOutcome::Won { points: 140 });
        assert_eq!(machine.session().score, 140);
    }

    #[test]
    fn test_win_on_last_allowed_miss_count() {
        let mut machine = small_machine();
        machine.start_round().unwrap();
        for letter in ['B', 'D', 'E', 'F', 'G'] {
            assert_eq!(machine.guess_letter(letter), GuessOutcome::Miss);
        }
        machine.guess_letter('C');
        machine.guess_letter('A');
        assert_eq!(machine.guess_letter('T'), GuessOutcome::Won { points: 110 });
    }

    #[test]
    fn test_long_word_score_multiplier() {
        let mut machine = small_machine();
        machine.select_category("long").unwrap();
        machine.start_round().unwrap();
        for letter in "ELPHANT".chars() {
            machine.guess_letter(letter);
        }
        assert_eq!(machine.phase(), Phase::Won);
        assert_eq!(machine.session().score, 240);
    }

    #[test]
    fn test_score_accumulates_across_rounds() {
        let mut machine = small_machine();
        for _ in 0..3 {
            machine.start_round().unwrap();
            for letter in ['C', 'A', 'T'] {
                machine.guess_letter(letter);
            }
        }
        assert_eq!(machine.session().score, 480);
    }

    #[test]
    fn test_lives_floor_at_zero() {
        let mut machine = embedded_machine(0);
        for expected in [2, 1, 0, 0] {
            machine.start_round().unwrap();
            lose_round(&mut machine);
            assert_eq!(machine.session().lives, expected);
        }
        // No lives left does not lock the session.
        machine.start_round().unwrap();
        assert_eq!(machine.phase(), Phase::InProgress);
    }

    #[test]
    fn test_round_reset_clears_guesses() {
        let mut machine = embedded_machine(0);
        machine.start_round().unwrap();
        machine.toggle_hint();
        lose_round(&mut machine);

        machine.start_round().unwrap();
        let session = machine.session();
        assert!(session.guessed_letters.is_empty());
        assert_eq!(session.wrong_count, 0);
        assert!(!session.hint_visible);
        assert_eq!(session.phase, Phase::InProgress);
        assert_eq!(session.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_new_session_resets_score_and_lives() {
        let mut machine = small_machine();
        machine.start_round().unwrap();
        for letter in ['C', 'A', 'T'] {
            machine.guess_letter(letter);
        }
        machine.start_round().unwrap();
        lose_round(&mut machine);
        assert_eq!(machine.session().score, 160);
        assert_eq!(machine.session().lives, 2);

        machine.start_new_session().unwrap();
        let session = machine.session();
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, STARTING_LIVES);
        assert_eq!(session.phase, Phase::InProgress);
    }

    #[test]
    fn test_select_category_rejected_mid_round() {
        let mut machine = embedded_machine(0);
        machine.start_round().unwrap();
        assert!(!machine.select_category("nature").unwrap());
        assert_eq!(machine.session().category, "animals");

        lose_round(&mut machine);
        assert!(machine.select_category("nature").unwrap());
        assert_eq!(machine.session().category, "nature");
        // Selection alone does not start a round.
        assert_eq!(machine.phase(), Phase::Lost);

        machine.start_round().unwrap();
        assert_eq!(machine.session().word, "RAINBOW");
    }

    #[test]
    fn test_select_unknown_category_is_error() {
        let mut machine = embedded_machine(0);
        let err = machine.select_category("sports").unwrap_err();
        assert!(matches!(err, HangmanError::UnknownCategory(ref name) if name == "sports"));
        assert_eq!(machine.session().category, "animals");

        // Still reported while a round is in progress
        machine.start_round().unwrap();
        assert!(machine.select_category("Animals").is_err());
        assert_eq!(machine.phase(), Phase::InProgress);
    }

    #[test]
    fn test_toggles_work_in_any_phase() {
        let mut machine = embedded_machine(0);
        assert!(machine.toggle_hint());
        assert!(!machine.toggle_sound());
        machine.start_round().unwrap();
        assert!(!machine.session().hint_visible);
        assert!(machine.toggle_hint());
        lose_round(&mut machine);
        assert!(!machine.toggle_hint());
        assert!(machine.toggle_sound());
    }

    #[test]
    fn test_masked_word_and_letter_lists() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();
        assert_eq!(machine.masked_word(), "_ _ _ _ _ _ _");

        for letter in ['N', 'Z', 'E', 'A'] {
            machine.guess_letter(letter);
        }
        assert_eq!(machine.masked_word(), "_ E N _ _ _ N");
        assert_eq!(machine.wrong_letters(), vec!['Z', 'A']);
        assert_eq!(machine.correct_letters(), vec!['N', 'E']);
        assert_eq!(machine.correct_count(), 2);
        assert_eq!(machine.distinct_letter_count(), 6);
        assert_eq!(machine.figure(), figure_stage(2));
    }

    #[test]
    fn test_view_reveals_word_only_when_over() {
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        machine.start_round().unwrap();
        let view = machine.view();
        assert_eq!(view.revealed_word, None);
        assert_eq!(view.categories.len(), 4);
        assert_eq!(view.max_wrong, MAX_WRONG);

        lose_round(&mut machine);
        let view = machine.view();
        assert_eq!(view.phase, Phase::Lost);
        assert_eq!(view.revealed_word.as_deref(), Some("PENGUIN"));
        assert_eq!(view.wrong_letters.len(), MAX_WRONG as usize);
        assert!(view.is_wrong('A'));
        assert_eq!(view.figure, figure_stage(MAX_WRONG));
    }

    #[test]
    fn test_listeners_notified_on_change_only() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut machine = embedded_machine(ANIMALS_PENGUIN);
        let sink = Rc::clone(&calls);
        machine.subscribe(move |session| sink.borrow_mut().push(session.phase));

        machine.start_round().unwrap();
        machine.guess_letter('P');
        machine.guess_letter('P');
        machine.guess_letter('7');
        let _ = machine.select_category("nature");
        machine.toggle_hint();

        assert_eq!(calls.borrow().len(), 3);
        assert!(calls.borrow().iter().all(|p| *p == Phase::InProgress));
    }

    #[test]
    fn test_from_key_mapping() {
        use Phase::*;
        assert_eq!(UserAction::from_key(Key::Char('a'), InProgress), Some(UserAction::Guess('A')));
        assert_eq!(UserAction::from_key(Key::Char('h'), InProgress), Some(UserAction::Guess('H')));
        assert_eq!(UserAction::from_key(Key::Char('H'), Won), Some(UserAction::ToggleHint));
        assert_eq!(UserAction::from_key(Key::Char('h'), Idle), Some(UserAction::ToggleHint));
        assert_eq!(UserAction::from_key(Key::Enter, Won), Some(UserAction::PlayAgain));
        assert_eq!(UserAction::from_key(Key::Enter, Lost), Some(UserAction::PlayAgain));
        assert_eq!(UserAction::from_key(Key::Enter, InProgress), None);
        assert_eq!(UserAction::from_key(Key::Esc, InProgress), Some(UserAction::Exit));
        assert_eq!(UserAction::from_key(Key::Char('5'), InProgress), None);
    }

    #[derive(Default)]
    struct ScriptedInterface {
        actions: Vec<UserAction>,
        messages: Vec<String>,
        rounds_over: Vec<Phase>,
        exited: bool,
    }

    impl GameInterface for ScriptedInterface {
        fn display_state(&mut self, _view: &GameView) {}

        fn display_round_over(&mut self, view: &GameView) {
            self.rounds_over.push(view.phase);
        }

        fn display_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }

        fn display_exit_message(&mut self) {
            self.exited = true;
        }

        fn read_action(&mut self, _view: &GameView) -> Option<UserAction> {
            if self.actions.is_empty() {
                Some(UserAction::Exit)
            } else {
                Some(self.actions.remove(0))
            }
        }
    }

    #[test]
    fn test_game_loop_scripted_round() {
        let mut machine = small_machine();
        let mut interface = ScriptedInterface {
            actions: vec![
                UserAction::Guess('C'),
                UserAction::Guess('C'),
                UserAction::SelectCategory("long".to_string()),
                UserAction::Guess('A'),
                UserAction::Guess('T'),
                UserAction::SelectCategory("nowhere".to_string()),
                UserAction::SelectCategory("long".to_string()),
                UserAction::PlayAgain,
            ],
            ..ScriptedInterface::default()
        };

        game_loop(&mut machine, &mut interface).unwrap();

        assert!(interface.exited);
        assert_eq!(interface.rounds_over, vec![Phase::Won]);
        assert_eq!(interface.messages.len(), 4);
        assert!(interface.messages[0].contains("already tried"));
        assert!(interface.messages[1].contains("Finish the current round"));
        assert!(interface.messages[2].contains("Unknown category"));
        assert_eq!(machine.session().word, "ELEPHANT");
        assert_eq!(machine.session().score, 160);
    }
}
