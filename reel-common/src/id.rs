//! Video identifiers
//!
//! A video id is 12 bytes rendered as 24 hex characters:
//! - 4 bytes: big-endian Unix seconds at generation time
//! - 5 bytes: random value fixed for the lifetime of the process
//! - 3 bytes: big-endian counter, randomly seeded, incremented per id

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Number of raw bytes in a video id
pub const ID_BYTES: usize = 12;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| rand::random());

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK));

/// Returned when a string is not a well-formed video id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid video id: {0:?}")]
pub struct InvalidVideoId(pub String);

/// Store-generated identifier of a video record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId([u8; ID_BYTES]);

impl VideoId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse an id from its hex form (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, InvalidVideoId> {
        if s.len() != ID_BYTES * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidVideoId(s.to_string()));
        }

        let mut bytes = [0u8; ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidVideoId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Whether `s` is a well-formed id
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Unix seconds embedded at generation time
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for VideoId {
    type Err = InvalidVideoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VideoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VideoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
