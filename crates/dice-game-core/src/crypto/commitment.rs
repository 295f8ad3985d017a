//! HMAC commitments for the commit-reveal scheme.
//!
//! A party commits to a value in `[0, N)` by publishing
//! `HMAC-SHA256(key, decimal(value))` and later reveals both the value and
//! the key so the other side can recompute the digest.

use hmac::{Hmac, Mac};
use rand::{CryptoRng, Rng, RngCore};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Secret HMAC key, fresh for every commitment
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey([u8; KEY_LEN]);

impl HmacKey {
    /// Draw a new random key from a cryptographically secure source
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Public half of a commitment: HMAC-SHA256 over the decimal value
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitmentDigest([u8; 32]);

impl CommitmentDigest {
    /// Compute the digest of `value` under `key`
    pub fn compute(key: &HmacKey, value: u32) -> Self {
        let mut mac = new_mac(key);
        mac.update(value.to_string().as_bytes());
        Self(mac.finalize().into_bytes().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify that the given value and key produce this digest
    pub fn verify(&self, value: u32, key: &HmacKey) -> bool {
        let mut mac = new_mac(key);
        mac.update(value.to_string().as_bytes());
        mac.verify_slice(&self.0).is_ok()
    }
}

impl fmt::Debug for CommitmentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentDigest({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for CommitmentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

fn new_mac(key: &HmacKey) -> HmacSha256 {
    HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length")
}

/// A committed secret value.
///
/// The value stays hidden until [`Commitment::reveal`], which consumes the
/// commitment so it cannot back a second decision.
pub struct Commitment {
    value: u32,
    key: HmacKey,
    digest: CommitmentDigest,
}

impl Commitment {
    /// Commit to a value drawn uniformly from `[0, range)`.
    ///
    /// Panics if `range` is zero.
    pub fn commit<R: RngCore + CryptoRng>(range: u32, rng: &mut R) -> Self {
        assert!(range > 0, "commitment range must be non-empty");
        let value = rng.gen_range(0..range);
        let key = HmacKey::random(rng);
        let digest = CommitmentDigest::compute(&key, value);
        Self { value, key, digest }
    }

    /// The published digest
    pub fn digest(&self) -> CommitmentDigest {
        self.digest
    }

    /// Disclose the value and key
    pub fn reveal(self) -> Reveal {
        Reveal {
            value: self.value,
            key: self.key,
            digest: self.digest,
        }
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commitment")
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// An opened commitment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub value: u32,
    pub key: HmacKey,
    pub digest: CommitmentDigest,
}

impl Reveal {
    /// Recompute the HMAC and check it against the published digest
    pub fn verify(&self, digest: &CommitmentDigest) -> bool {
        digest.verify(self.value, &self.key)
    }
}
