//! Definition hashes.
//!
//! The game service emits the same 32-bit identifier either as an unsigned
//! value or as its signed two's-complement twin, and sometimes as decimal
//! text. [`DestinyHash`] always holds the canonical unsigned form, so any
//! two encodings of one logical hash compare and hash equal.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Normalizes any integer-like identifier to its unsigned 32-bit form.
///
/// Matches `value >>> 0`: the value is taken modulo 2^32.
#[must_use]
pub const fn canonicalize(value: i64) -> u32 {
    value as u32
}

/// Canonical (unsigned) 32-bit definition hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DestinyHash(u32);

impl DestinyHash {
    /// Creates a hash from its unsigned representation.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates a hash from its signed representation.
    #[must_use]
    pub const fn from_signed(value: i32) -> Self {
        Self(value as u32)
    }

    /// Returns the canonical unsigned value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the signed twin, as older endpoints and SQLite exports use.
    #[must_use]
    pub const fn as_signed(&self) -> i32 {
        self.0 as i32
    }

    /// Parses a hash from signed or unsigned decimal text.
    pub fn parse(s: &str) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<u32> for DestinyHash {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<i32> for DestinyHash {
    fn from(value: i32) -> Self {
        Self::from_signed(value)
    }
}

impl From<i64> for DestinyHash {
    fn from(value: i64) -> Self {
        Self(canonicalize(value))
    }
}

impl From<u64> for DestinyHash {
    fn from(value: u64) -> Self {
        Self(value as u32)
    }
}

impl From<DestinyHash> for u32 {
    fn from(hash: DestinyHash) -> Self {
        hash.0
    }
}

impl fmt::Display for DestinyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DestinyHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map(Self::from)
            .map_err(|_| Error::InvalidHash(s.to_string()))
    }
}

impl Serialize for DestinyHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for DestinyHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HashVisitor)
    }
}

struct HashVisitor;

impl Visitor<'_> for HashVisitor {
    type Value = DestinyHash;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a signed or unsigned 32-bit hash, as a number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DestinyHash::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(DestinyHash::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.fract() != 0.0 {
            return Err(E::custom(format!("hash {v} is not an integer")));
        }
        Ok(DestinyHash::from(v as i64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}
