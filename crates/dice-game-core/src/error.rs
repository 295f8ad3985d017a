//! Error types.

use thiserror::Error;

/// Startup errors from loading the dice configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least 3 dice must be provided as input (got {found}).")]
    NotEnoughDice { found: usize },

    #[error("Die {index} has no faces.")]
    EmptyDie { index: usize },

    #[error("Die {die} has an invalid face {face:?}: faces must be non-negative integers.")]
    InvalidFace { die: usize, face: String },

    #[error("Die {index} has {faces} faces, but every die needs at least {min} faces.")]
    TooFewFaces { index: usize, faces: usize, min: usize },
}

/// Per-line input rejections; the session re-prompts and keeps its state
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input. Please select 0, 1, X, or ?. Try again.")]
    InvalidGuess,

    #[error("Invalid input. Please select a valid option.")]
    InvalidOption,

    #[error("This dice is unavailable. Please select another dice.")]
    DieUnavailable(usize),

    #[error("Invalid choice. Please select a valid dice index.")]
    DieOutOfRange,

    #[error("Invalid input. Please select a number between 0 and 5.")]
    InvalidModulo,
}
