//! File modification timestamps and platform-aware truncated comparison

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sub-second precision retained by the platform's remote-filesystem stack.
///
/// Samba and the Linux SMB client keep 100ns units; the macOS SMB client
/// keeps whole seconds only. Stored timestamps may have passed through
/// either, so comparisons must not demand more precision than survives
/// the round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Whole seconds only.
    Seconds,
    /// 100-nanosecond units.
    HundredNanos,
}

/// A file modification time with sub-second precision.
///
/// Immutable once read; the zero timestamp doubles as "never tagged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl Timestamp {
    #[must_use]
    pub fn new(secs: u64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Whether this is the zero timestamp (no recorded mtime).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.secs == 0 && self.nanos == 0
    }

    /// Parse the dotted decimal form stored on disk (`"<secs>.<nanos>"`).
    ///
    /// Stored metadata must never abort verification, so each malformed
    /// component degrades to zero instead of failing; a degraded value
    /// simply classifies as a mismatch downstream.
    #[must_use]
    pub fn parse_dotted(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let mut parts = text.splitn(2, '.');
        let secs = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let nanos = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        Self { secs, nanos }
    }

    /// Equality at the precision the platform guarantees.
    ///
    /// Seconds must always match exactly. At `HundredNanos` the nanosecond
    /// fields are compared after integer division by 100; at `Seconds`
    /// they are ignored entirely.
    #[must_use]
    pub fn equal_truncated(&self, other: &Self, resolution: Resolution) -> bool {
        if self.secs != other.secs {
            return false;
        }
        match resolution {
            Resolution::Seconds => true,
            Resolution::HundredNanos => self.nanos / 100 == other.nanos / 100,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}.{:09}", self.secs, self.nanos)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                secs: d.as_secs(),
                nanos: d.subsec_nanos(),
            },
            // Pre-epoch mtimes degrade to the zero timestamp.
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        let ts = Timestamp::new(1_560_177_189, 769_244_818);
        assert_eq!(ts.to_string(), "1560177189.769244818");

        let early = Timestamp::new(42, 7);
        assert_eq!(early.to_string(), "0000000042.000000007");
    }

    #[test]
    fn test_parse_dotted_roundtrip() {
        let ts = Timestamp::new(1_748_509_446, 586_368_096);
        assert_eq!(Timestamp::parse_dotted(ts.to_string().as_bytes()), ts);
    }

    #[test]
    fn test_parse_dotted_degrades_to_zero() {
        assert_eq!(Timestamp::parse_dotted(b""), Timestamp::default());
        assert_eq!(Timestamp::parse_dotted(b"garbage"), Timestamp::default());
        assert_eq!(
            Timestamp::parse_dotted(b"123.not-a-number"),
            Timestamp::new(123, 0)
        );
        assert_eq!(Timestamp::parse_dotted(b".5"), Timestamp::new(0, 5));
    }

    #[test]
    fn test_truncated_equality_seconds_always_exact() {
        let a = Timestamp::new(100, 0);
        let b = Timestamp::new(101, 0);
        assert!(!a.equal_truncated(&b, Resolution::Seconds));
        assert!(!a.equal_truncated(&b, Resolution::HundredNanos));
    }

    #[test]
    fn test_truncated_equality_hundred_nanos() {
        // Differ only below the 100ns remainder: equal under truncation,
        // unequal under exact comparison.
        let a = Timestamp::new(100, 123_456_789);
        let b = Timestamp::new(100, 123_456_701);
        assert_ne!(a, b);
        assert!(a.equal_truncated(&b, Resolution::HundredNanos));

        let c = Timestamp::new(100, 123_456_889);
        assert!(!a.equal_truncated(&c, Resolution::HundredNanos));
    }

    #[test]
    fn test_truncated_equality_whole_seconds() {
        let a = Timestamp::new(100, 999_999_999);
        let b = Timestamp::new(100, 0);
        assert!(a.equal_truncated(&b, Resolution::Seconds));
        assert!(!a.equal_truncated(&b, Resolution::HundredNanos));
    }

    #[test]
    fn test_is_zero() {
        assert!(Timestamp::default().is_zero());
        assert!(!Timestamp::new(0, 1).is_zero());
        assert!(!Timestamp::new(1, 0).is_zero());
    }
}
