//! Round scoring.
//!
//! A won round earns a flat base plus a bonus for every wrong guess left
//! unused. Words longer than [`LONG_WORD_THRESHOLD`] letters earn half as
//! much again, rounded half-up.

pub const BASE_SCORE: u32 = 100;
pub const BONUS_PER_SPARE_GUESS: u32 = 10;
pub const LONG_WORD_THRESHOLD: usize = 7;

/// Points for winning a round on `word` after `wrong_count` misses.
///
/// `wrong_count` above `max_wrong` is clamped, so the bonus never goes
/// negative.
#[must_use]
pub fn compute_score(word: &str, wrong_count: u32, max_wrong: u32) -> u32 {
    let spare = max_wrong - wrong_count.min(max_wrong);
    let total = BASE_SCORE + spare * BONUS_PER_SPARE_GUESS;

    if word.chars().count() > LONG_WORD_THRESHOLD {
        // x1.5, half-up
        (total * 3 + 1) / 2
    } else {
        total
    }
}
