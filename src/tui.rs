//! TUI (Terminal User Interface) module for Hangman
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Layout
//! Header (score, lives, sound) / category bar / gallows and word panel /
//! on-screen keyboard / status / instructions, with a popup over everything
//! once a round is won or lost.
//!
//! # Keys
//! Letters guess, Tab toggles the hint, Ctrl-S toggles sound, Ctrl-N starts
//! a new game, Esc quits. Between rounds: digits pick a category, Enter plays
//! again, `N` starts a new game, `H` toggles the hint.

use crate::game_state::{GameInterface, GameView, Key, Phase, UserAction};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::io;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const KEYBOARD_ROWS: [&str; 2] = ["ABCDEFGHIJKLM", "NOPQRSTUVWXYZ"];
const POPUP_WIDTH_PERCENT: u16 = 50;
const POPUP_HEIGHT: u16 = 9;
const BELL: &str = "\u{7}";

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const WORD_STYLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

#[derive(Clone, Copy, PartialEq, Debug)]
enum LetterState {
    Unused,
    Correct,
    Wrong,
}

impl LetterState {
    fn of(letter: char, view: &GameView) -> Self {
        if view.is_wrong(letter) {
            Self::Wrong
        } else if view.is_guessed(letter) {
            Self::Correct
        } else {
            Self::Unused
        }
    }

    fn colors(self) -> (Color, Color) {
        match self {
            Self::Unused => (Color::Gray, Color::Black),
            Self::Correct => (Color::Green, Color::Black),
            Self::Wrong => (Color::Red, Color::White),
        }
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    view: &'a GameView,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    view: Option<GameView>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: raw mode, alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            view: None,
            message: String::new(),
            error_message: String::new(),
            status: "Ready".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Draw the current UI state to the terminal.
    ///
    /// Returns an error if rendering fails.
    fn draw(&mut self) -> Result<(), io::Error> {
        let Some(view) = self.view.as_ref() else {
            return Ok(());
        };
        let ctx = RenderContext {
            view,
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn ring_bell(&mut self) {
        if let Err(e) = execute!(self.terminal.backend_mut(), Print(BELL)) {
            debug_log!("Bell error: {}", e);
        }
    }

    /// Render the complete UI layout using the provided context.
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(3),  // Categories
                Constraint::Min(11),    // Gallows and word
                Constraint::Length(4),  // Keyboard
                Constraint::Length(3),  // Status line
                Constraint::Length(3),  // Instructions
            ])
            .split(f.area());

        Self::render_header(f, chunks[0], ctx.view);
        Self::render_categories(f, chunks[1], ctx.view);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(30)])
            .split(chunks[2]);
        Self::render_figure(f, middle[0], ctx.view);
        Self::render_word_panel(f, middle[1], ctx);

        Self::render_keyboard(f, chunks[3], ctx.view);
        Self::render_status(f, chunks[4], ctx.status);
        Self::render_instructions(f, chunks[5], ctx.view.phase);

        if ctx.view.phase.is_round_over() {
            Self::render_round_over(f, ctx.view);
        }
    }

    fn render_header(f: &mut Frame, area: Rect, view: &GameView) {
        let sound = if view.sound_enabled { "on" } else { "off" };
        let line = Line::from(vec![
            Span::styled("HANGMAN", HEADER_STYLE),
            Span::raw("   "),
            Span::styled(format!("Score: {}", view.score), INFO_STYLE),
            Span::raw("   "),
            Span::styled(format!("Lives: {}", view.lives), ERROR_STYLE),
            Span::raw("   "),
            Span::raw(format!("Sound: {sound}")),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_categories(f: &mut Frame, area: Rect, view: &GameView) {
        let locked = view.phase == Phase::InProgress;
        let mut spans = Vec::new();
        for (i, name) in view.categories.iter().enumerate() {
            let style = if *name == view.category {
                Style::default().fg(Color::Black).bg(Color::Blue)
            } else if locked {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {}:{} ", i + 1, capitalize(name)), style));
            spans.push(Span::raw(" "));
        }
        let title = if locked { "Category (locked)" } else { "Category" };
        let paragraph =
            Paragraph::new(Line::from(spans)).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_figure(f: &mut Frame, area: Rect, view: &GameView) {
        let paragraph = Paragraph::new(view.figure)
            .style(Style::default().fg(Color::White))
            .block(Block::default().title("Gallows").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_word_panel(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let view = ctx.view;
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(view.masked_word.clone(), WORD_STYLE)),
            Line::from(""),
        ];

        if view.hint_visible {
            lines.push(Line::from(Span::styled(
                format!("Hint: {}", view.hint),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(format!(
            "Wrong guesses: {}/{}    Letters found: {}/{}    Difficulty: {}",
            view.wrong_count, view.max_wrong, view.correct_count, view.distinct_letters, view.difficulty
        )));
        let wrong = if view.wrong_letters.is_empty() {
            "None".to_string()
        } else {
            view.wrong_letters
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(Line::from(vec![
            Span::raw("Wrong letters: "),
            Span::styled(wrong, ERROR_STYLE),
        ]));

        if !ctx.message.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(ctx.message, MESSAGE_STYLE)));
        }
        if !ctx.error_message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.error_message, ERROR_STYLE)));
        }

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title("Word").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_keyboard(f: &mut Frame, area: Rect, view: &GameView) {
        let lines: Vec<Line> = KEYBOARD_ROWS
            .iter()
            .map(|row| {
                let mut spans = Vec::new();
                for letter in row.chars() {
                    let (bg, fg) = LetterState::of(letter, view).colors();
                    spans.push(Span::styled(
                        format!(" {letter} "),
                        Style::default().fg(fg).bg(bg),
                    ));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title("Keyboard").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, phase: Phase) {
        let text = match phase {
            Phase::InProgress => {
                "A-Z: Guess | TAB: Hint | CTRL-S: Sound | CTRL-N: New Game | ESC: Quit"
            }
            Phase::Won | Phase::Lost => {
                "ENTER: Play Again | N: New Game | 1-9: Category | H: Hint | ESC: Quit"
            }
            Phase::Idle => "1-9: Category | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn render_round_over(f: &mut Frame, view: &GameView) {
        let area = popup_area(f.area());
        let won = view.phase == Phase::Won;
        let word = view.revealed_word.as_deref().unwrap_or_default();

        let (title, title_style, detail) = if won {
            ("Congratulations!", SUCCESS_STYLE, "You guessed the word!".to_string())
        } else {
            ("Game Over!", ERROR_STYLE, format!("The word was: {word}"))
        };
        let lines = vec![
            Line::from(Span::styled(title, title_style)),
            Line::from(""),
            Line::from(detail),
            Line::from(Span::styled(format!("Final Score: {}", view.score), INFO_STYLE)),
            Line::from(""),
            Line::from("ENTER: Play Again    N: New Game"),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        // Poll with a timeout to check if events are available
        let poll_result = event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))?;

        if !poll_result {
            // No event available, return None to continue the loop
            return Ok(None);
        }

        let event = event::read()?;
        debug_log!("handle_input() - Event received: {:?}", event);

        match event {
            Event::Resize(_, _) => {
                debug_log!("handle_input() - Resize, redrawing");
                self.draw_or_log();
                Ok(None)
            }
            Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {
                debug_log!("handle_input() - Ignoring non-key event");
                Ok(None)
            }
            Event::Key(key) => {
                // Only process Press events, ignore Release and Repeat to avoid double input
                if key.kind != KeyEventKind::Press {
                    return Ok(None);
                }

                // Filter out garbage from terminal focus escape sequences (alt-tab)
                if let KeyCode::Char(c) = key.code
                    && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
                {
                    debug_log!(
                        "handle_input() - Ignoring invalid character from escape sequence: {:?}",
                        c
                    );
                    return Ok(None);
                }

                let Some(view) = self.view.as_ref() else {
                    return Ok(None);
                };
                let action = map_key_event(key, view);
                if action.is_none() {
                    if let KeyCode::Char(c) = key.code
                        && !c.is_ascii_alphanumeric()
                    {
                        self.error_message = format!("Only letters are allowed! ('{c}' is not a letter)");
                    }
                    debug_log!("handle_input() - No action for key {:?}", key.code);
                }
                Ok(action)
            }
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn popup_area(area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(POPUP_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(area);
    let side = (100 - POPUP_WIDTH_PERCENT) / 2;
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(side),
            Constraint::Percentage(POPUP_WIDTH_PERCENT),
            Constraint::Percentage(side),
        ])
        .split(vertical[1])[1]
}

/// Translate a crossterm key press into a game action for the current view.
fn map_key_event(key: KeyEvent, view: &GameView) -> Option<UserAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('n' | 'N') => Some(UserAction::NewGame),
            KeyCode::Char('s' | 'S') => Some(UserAction::ToggleSound),
            KeyCode::Char('c' | 'C') => Some(UserAction::Exit),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Tab => Some(UserAction::ToggleHint),
        KeyCode::Esc => UserAction::from_key(Key::Esc, view.phase),
        KeyCode::Enter => UserAction::from_key(Key::Enter, view.phase),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if view.phase == Phase::InProgress {
                return None;
            }
            let index = c.to_digit(10)? as usize;
            index
                .checked_sub(1)
                .and_then(|i| view.categories.get(i))
                .map(|name| UserAction::SelectCategory(name.clone()))
        }
        KeyCode::Char('n' | 'N') if view.phase.is_round_over() => Some(UserAction::NewGame),
        KeyCode::Char(c) => UserAction::from_key(Key::Char(c), view.phase),
        _ => None,
    }
}

impl GameInterface for TuiInterface {
    fn display_state(&mut self, view: &GameView) {
        self.status = match view.phase {
            Phase::InProgress => format!("Guessing a word from '{}'", view.category),
            Phase::Won => "Round won".to_string(),
            Phase::Lost => "Round lost".to_string(),
            Phase::Idle => "Pick a category".to_string(),
        };
        self.view = Some(view.clone());
        self.draw_or_log();
    }

    fn display_round_over(&mut self, view: &GameView) {
        info_log!("TuiInterface::display_round_over() - {:?}", view.phase);
        self.view = Some(view.clone());
        if view.sound_enabled {
            self.ring_bell();
        }
        self.draw_or_log();
    }

    fn display_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }

    fn read_action(&mut self, view: &GameView) -> Option<UserAction> {
        self.view = Some(view.clone());
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }

            match self.handle_input() {
                Ok(Some(action)) => {
                    info_log!("read_action() - Action received: {:?}", action);
                    self.message.clear();
                    self.error_message.clear();
                    return Some(action);
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("read_action() - Error handling input ({}), returning Exit", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
