//! Dice Game Core Library
//!
//! This crate provides the fairness commitment protocol, the die model,
//! win-probability analysis, and the turn state machine for a two-party
//! generalized dice game.

pub mod crypto;
pub mod dice;
pub mod error;
pub mod game;

pub use crypto::{Commitment, CommitmentDigest, HmacKey, Reveal};
pub use dice::{Die, DieSet, ProbabilityMatrix, WinProbability};
pub use error::{ConfigError, InputError};
pub use game::{Control, Line, Output, Party, Session, SessionConfig, Verdict};

/// Both modulo contributions and the shared result live in `[0, MODULUS)`
pub const MODULUS: u32 = 6;
