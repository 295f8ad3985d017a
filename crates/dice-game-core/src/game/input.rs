//! Line parsing for each phase.

use crate::error::InputError;
use crate::MODULUS;
use std::collections::BTreeSet;

/// A line classified before phase-specific parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Help,
    Value(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a trimmed line. `X` and `?` are exact matches.
    pub fn parse(line: &'a str) -> Self {
        match line {
            "X" => Command::Exit,
            "?" => Command::Help,
            other => Command::Value(other),
        }
    }
}

/// First-player guess: exactly `0` or `1`
pub fn parse_guess(input: &str) -> Result<u32, InputError> {
    match input {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(InputError::InvalidGuess),
    }
}

/// Die index: any non-negative integer string, then range and availability checks
pub fn parse_die_index(
    input: &str,
    die_count: usize,
    used: &BTreeSet<usize>,
) -> Result<usize, InputError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidOption);
    }
    // All digits, so a parse failure can only be overflow.
    let index = input.parse::<usize>().map_err(|_| InputError::DieOutOfRange)?;
    if used.contains(&index) {
        return Err(InputError::DieUnavailable(index));
    }
    if index >= die_count {
        return Err(InputError::DieOutOfRange);
    }
    Ok(index)
}

/// Modulo contribution: a single ASCII digit below [`MODULUS`]
pub fn parse_modulo(input: &str) -> Result<u32, InputError> {
    match input.as_bytes() {
        [b] if b.is_ascii_digit() && u32::from(b - b'0') < MODULUS => Ok(u32::from(b - b'0')),
        _ => Err(InputError::InvalidModulo),
    }
}
