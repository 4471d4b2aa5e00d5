use crate::debug_log;
use crate::error::{HangmanError, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/wordbank.txt");

const FIELD_SEPARATOR: char = '|';
const ENTRY_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// A single guessable word with its hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub hint: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Category {
    name: String,
    entries: Vec<WordEntry>,
}

/// Categorized words, in the order the categories were declared.
///
/// Every category holds at least one entry and there is at least one
/// category; the loaders refuse anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBank {
    categories: Vec<Category>,
}

impl WordBank {
    /// The word bank compiled into the binary.
    pub fn embedded() -> Result<Self> {
        load_wordbank_from_str(EMBEDDED_WORDBANK)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn first_category(&self) -> &str {
        // Loaders guarantee at least one category.
        self.categories.first().map_or("", |c| c.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.name == category)
    }

    pub fn words_for(&self, category: &str) -> Result<&[WordEntry]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.entries.as_slice())
            .ok_or_else(|| HangmanError::UnknownCategory(category.to_string()))
    }
}

fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic())
}

fn invalid(line: usize, reason: impl Into<String>) -> HangmanError {
    HangmanError::InvalidWordBank {
        line,
        reason: reason.into(),
    }
}

fn parse_entry(line: &str, line_no: usize) -> Result<Option<WordEntry>> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() != ENTRY_FIELDS {
        return Err(invalid(
            line_no,
            format!(
                "expected 'WORD | hint | difficulty', found {} field(s)",
                fields.len()
            ),
        ));
    }

    let word = fields[0].to_uppercase();
    if !is_valid_word(&word) {
        debug_log!("Skipping word bank line {}: '{}' is not a plain word", line_no, fields[0]);
        return Ok(None);
    }
    let difficulty = fields[2]
        .parse::<Difficulty>()
        .map_err(|reason| invalid(line_no, reason))?;

    Ok(Some(WordEntry {
        word,
        hint: fields[1].to_string(),
        difficulty,
    }))
}

pub fn load_wordbank_from_str(data: &str) -> Result<WordBank> {
    let mut categories: Vec<Category> = Vec::new();
    let mut header_lines: Vec<usize> = Vec::new();

    for (index, raw) in data.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                return Err(invalid(line_no, "empty category name"));
            }
            if categories.iter().any(|c| c.name == name) {
                return Err(invalid(line_no, format!("duplicate category '{name}'")));
            }
            categories.push(Category {
                name,
                entries: Vec::new(),
            });
            header_lines.push(line_no);
            continue;
        }

        let Some(category) = categories.last_mut() else {
            return Err(invalid(line_no, "entry before any [category] header"));
        };
        if let Some(entry) = parse_entry(line, line_no)? {
            category.entries.push(entry);
        }
    }

    if categories.is_empty() {
        return Err(invalid(0, "no categories defined"));
    }
    for (category, line_no) in categories.iter().zip(&header_lines) {
        if category.entries.is_empty() {
            return Err(invalid(
                *line_no,
                format!("category '{}' has no valid words", category.name),
            ));
        }
    }

    Ok(WordBank { categories })
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> Result<WordBank> {
    let data = fs::read_to_string(path)?;
    load_wordbank_from_str(&data)
}
