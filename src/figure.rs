// ASCII gallows, one stage per wrong guess.
// Stage 1 already has the rope so that stage 6 can show both legs.

pub const HANGMAN_STAGES: [&str; 7] = [
    "",
    "  +---+
  |   |
      |
      |
      |
      |
=========",
    "  +---+
  |   |
  O   |
      |
      |
      |
=========",
    "  +---+
  |   |
  O   |
  |   |
      |
      |
=========",
    "  +---+
  |   |
  O   |
 /|   |
      |
      |
=========",
    "  +---+
  |   |
  O   |
 /|\\  |
      |
      |
=========",
    "  +---+
  |   |
  O   |
 /|\\  |
 / \\  |
      |
=========",
];

/// Stage for `wrong_count`; anything past the last stage shows stage 0.
#[must_use]
pub fn figure_stage(wrong_count: u32) -> &'static str {
    usize::try_from(wrong_count)
        .ok()
        .and_then(|index| HANGMAN_STAGES.get(index))
        .copied()
        .unwrap_or(HANGMAN_STAGES[0])
}
