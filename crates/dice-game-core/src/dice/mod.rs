//! Die definitions and the configured die set.

mod probability;

pub use probability::{win_probability, ProbabilityMatrix, WinProbability};

use crate::error::ConfigError;
use crate::MODULUS;
use std::fmt;
use std::str::FromStr;

/// Minimum number of dice in a game
pub const MIN_DICE: usize = 3;

/// Minimum faces per die; round resolution indexes faces in `[0, MODULUS)`
pub const MIN_FACES: usize = MODULUS as usize;

/// A die: an ordered, immutable sequence of face values
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Die {
    faces: Vec<u32>,
}

impl Die {
    /// Create a die from its faces. Rejects an empty face list.
    ///
    /// A die built on its own reports errors as position 0.
    pub fn new(faces: Vec<u32>) -> Result<Self, ConfigError> {
        Self::new_at(faces, 0)
    }

    fn new_at(faces: Vec<u32>, index: usize) -> Result<Self, ConfigError> {
        if faces.is_empty() {
            return Err(ConfigError::EmptyDie { index });
        }
        Ok(Self { faces })
    }

    /// Parse a comma-separated face list for the die at position `index`
    fn parse_at(s: &str, index: usize) -> Result<Self, ConfigError> {
        if s.trim().is_empty() {
            return Err(ConfigError::EmptyDie { index });
        }
        let faces = s
            .split(',')
            .map(|face| {
                face.trim().parse::<u32>().map_err(|_| ConfigError::InvalidFace {
                    die: index,
                    face: face.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new_at(faces, index)
    }

    /// Face value at `face_index`.
    ///
    /// Panics when the index is out of range; callers only pass indices
    /// below [`MIN_FACES`], which every loaded die satisfies.
    pub fn face_at(&self, face_index: usize) -> u32 {
        self.faces[face_index]
    }

    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FromStr for Die {
    type Err = ConfigError;

    /// Parse a comma-separated face list such as `2,2,4,4,9,9`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_at(s, 0)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, face) in self.faces.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", face)?;
        }
        write!(f, "]")
    }
}

/// The dice configured for a session, loaded once and never mutated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DieSet {
    dice: Vec<Die>,
}

impl DieSet {
    /// Validate and wrap a list of dice
    pub fn new(dice: Vec<Die>) -> Result<Self, ConfigError> {
        if dice.len() < MIN_DICE {
            return Err(ConfigError::NotEnoughDice { found: dice.len() });
        }
        if let Some((index, die)) = dice.iter().enumerate().find(|(_, d)| d.len() < MIN_FACES) {
            return Err(ConfigError::TooFewFaces {
                index,
                faces: die.len(),
                min: MIN_FACES,
            });
        }
        Ok(Self { dice })
    }

    /// Parse one die specification per argument
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, ConfigError> {
        if specs.len() < MIN_DICE {
            return Err(ConfigError::NotEnoughDice { found: specs.len() });
        }
        let dice = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Die::parse_at(spec.as_ref(), index))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(dice)
    }

    pub fn get(&self, die_index: usize) -> Option<&Die> {
        self.dice.get(die_index)
    }

    /// Face lookup across the set. Panics on an out-of-range index.
    pub fn face_at(&self, die_index: usize, face_index: usize) -> u32 {
        self.dice[die_index].face_at(face_index)
    }

    pub fn all(&self) -> &[Die] {
        &self.dice
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }
}
