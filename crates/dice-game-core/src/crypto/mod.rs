//! Cryptographic primitives for the fairness protocol.
//!
//! This module provides:
//! - HmacKey and CommitmentDigest for keyed hashing
//! - Commitment and Reveal for the commit-reveal scheme

mod commitment;

pub use commitment::{Commitment, CommitmentDigest, HmacKey, Reveal, KEY_LEN};
