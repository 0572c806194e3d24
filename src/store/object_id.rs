//! Document identifiers.
//!
//! # Layout
//! ```text
//! | 4 bytes seconds (BE) | 5 bytes per-process random | 3 bytes counter (BE) |
//! ```
//!
//! # Design Decisions
//! - Canonical string form is 24 lowercase hex characters
//! - Parsing accepts either case; formatting always emits lowercase

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the canonical hex form.
pub const OBJECT_ID_HEX_LEN: usize = 24;

static COUNTER: AtomicU32 = AtomicU32::new(0);
static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();

/// A 12-byte document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let random = PROCESS_UNIQUE.get_or_init(|| {
            let mut bytes = [0u8; 5];
            bytes.iter_mut().for_each(|b| *b = fastrand::u8(..));
            bytes
        });
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(random);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// True if `s` is exactly 24 hex characters (either case).
    pub fn is_valid(s: &str) -> bool {
        s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: {0}")]
pub struct InvalidObjectId(pub String);

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| InvalidObjectId(s.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| InvalidObjectId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_canonical() {
        let id = ObjectId::new().to_string();
        assert_eq!(id.len(), OBJECT_ID_HEX_LEN);
        assert!(ObjectId::is_valid(&id));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id: ObjectId = "507F191E810C19729DE860EA".parse().unwrap();
        assert_eq!(id.to_string(), "507f191e810c19729de860ea");
    }

    #[test]
    fn test_validity() {
        assert!(ObjectId::is_valid("507f191e810c19729de860ea"));
        assert!(!ObjectId::is_valid("507f191e810c19729de860e"));
        assert!(!ObjectId::is_valid("507f191e810c19729de860eaa"));
        assert!(!ObjectId::is_valid("507f191e810c19729de860eg"));
        assert!(!ObjectId::is_valid(""));
        assert!("schema".parse::<ObjectId>().is_err());
    }
}
