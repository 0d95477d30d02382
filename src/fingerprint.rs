//! Fingerprints and the `Hashable` capability
//!
//! A fingerprint is an opaque byte sequence summarizing an entity's observable state.
//! The registry only compares fingerprints for equality; how they are produced is up to
//! each entity. [`FingerprintBuilder`] is offered as a ready-made BLAKE3 hasher for
//! entities that do not have a natural fingerprint of their own.

use crate::error::HashError;
use blake3::Hasher;
use std::fmt;

/// Byte-sequence summary of an entity's current content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    pub fn new(bytes: Vec<u8>) -> Self {
        Fingerprint(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering, used in log fields.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Fingerprint {
    fn from(bytes: Vec<u8>) -> Self {
        Fingerprint(bytes)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        Fingerprint(bytes.to_vec())
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Fingerprint(s.as_bytes().to_vec())
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Fingerprint(s.into_bytes())
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Fingerprint(bytes.to_vec())
    }
}

/// Capability required of every entity the registry can track.
///
/// `hash` must be pure and deterministic with respect to the entity's current state,
/// and cheap enough to call on every scan.
pub trait Hashable: Send + Sync {
    fn hash(&self) -> Fingerprint;

    /// Fallible variant used by `try_register` and `try_scan_changes`.
    ///
    /// Entities whose fingerprint depends on something that can fail (a file, a socket)
    /// override this; the default never fails.
    fn try_hash(&self) -> Result<Fingerprint, HashError> {
        Ok(self.hash())
    }
}

/// Incremental BLAKE3 fingerprint builder
///
/// Field order matters: the same fields fed in a different order produce a different
/// fingerprint.
pub struct FingerprintBuilder {
    hasher: Hasher,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Length-prefixed so that ("ab", "c") and ("a", "bc") differ.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.update_u64(s.len() as u64);
        self.hasher.update(s.as_bytes());
        self
    }

    /// 8 bytes, big-endian
    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_be_bytes());
        self
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint::from(*self.hasher.finalize().as_bytes())
    }
}

/// BLAKE3 digest of arbitrary data as a fingerprint.
pub fn digest(data: &[u8]) -> Fingerprint {
    let mut builder = FingerprintBuilder::new();
    builder.update(data);
    builder.finish()
}
