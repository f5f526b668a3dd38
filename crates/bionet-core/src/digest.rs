//! Import provenance fingerprints.
//!
//! Every `FILE_UPLOAD` event carries a [`SourceDigest`] of what the session
//! read: the importer's format name followed by the raw source bytes. Two
//! snapshots with equal digests were built by the same importer from the same
//! file contents, whatever the file was called.
//!
//! Serialized as `fnv1a64:<16 lowercase hex digits>`. Not a security primitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;

pub const SOURCE_DIGEST_PREFIX: &str = "fnv1a64:";

/// Streaming FNV-1a 64.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Fnv1a64(Self::OFFSET_BASIS)
    }
}

impl Hasher for Fnv1a64 {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDigest(pub u64);

impl SourceDigest {
    pub fn of_source(format: &str, bytes: &[u8]) -> Self {
        let mut hasher = Fnv1a64::default();
        hasher.write(format.as_bytes());
        // format names never contain NUL
        hasher.write_u8(0);
        hasher.write(bytes);
        SourceDigest(hasher.finish())
    }

    /// Inverse of `Display`; `None` for other digest schemes.
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.strip_prefix(SOURCE_DIGEST_PREFIX)?;
        if hex.len() != 16 {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(SourceDigest)
    }
}

impl fmt::Display for SourceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SOURCE_DIGEST_PREFIX}{:016x}", self.0)
    }
}
