use thiserror::Error;

#[derive(Error, Debug)]
pub enum HangmanError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid word bank (line {line}): {reason}")]
    InvalidWordBank { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HangmanError>;
