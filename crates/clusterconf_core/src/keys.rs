//! Key layout of the configuration subspace.
//!
//! Configuration lives under a reserved prefix of the cluster's system
//! keyspace. Keys are compared in lexicographic byte order.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// A configuration key (full key, including the subspace prefix).
pub type ConfigKey = Bytes;

/// A configuration value.
pub type ConfigValue = Bytes;

/// Prefix shared by every configuration key.
pub const CONFIG_KEYS_PREFIX: &[u8] = b"\xff/conf/";

/// Prefix of the server exclusion list, nested inside the configuration
/// subspace.
pub const EXCLUDED_SERVERS_PREFIX: &[u8] = b"\xff/conf/excluded/";

/// Half-open key range `[begin, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub begin: Bytes,
    /// Exclusive upper bound.
    pub end: Bytes,
}

impl KeyRange {
    /// Creates a range from its bounds.
    pub fn new(begin: impl Into<Bytes>, end: impl Into<Bytes>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// Returns the range covering every key that starts with `prefix`.
    pub fn prefix(prefix: &[u8]) -> Self {
        Self {
            begin: Bytes::copy_from_slice(prefix),
            end: strinc(prefix),
        }
    }

    /// Returns true if the range contains no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    /// Returns true if `key` lies inside the range.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= &self.begin[..] && key < &self.end[..]
    }

    /// Returns true if the two ranges share at least one key.
    #[must_use]
    pub fn intersects(&self, other: &KeyRange) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Returns the overlap of the two ranges.
    ///
    /// The result is empty (`begin >= end`) when the ranges do not intersect.
    #[must_use]
    pub fn intersection(&self, other: &KeyRange) -> KeyRange {
        KeyRange {
            begin: self.begin.clone().max(other.begin.clone()),
            end: self.end.clone().min(other.end.clone()),
        }
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            printable(&self.begin),
            printable(&self.end)
        )
    }
}

/// The whole configuration subspace.
#[must_use]
pub fn config_keys() -> KeyRange {
    KeyRange::prefix(CONFIG_KEYS_PREFIX)
}

/// The range holding server exclusions.
#[must_use]
pub fn excluded_servers_keys() -> KeyRange {
    KeyRange::prefix(EXCLUDED_SERVERS_PREFIX)
}

/// Builds the full key for a configuration field name such as `"logs"`.
#[must_use]
pub fn config_key(suffix: &str) -> ConfigKey {
    let mut key = BytesMut::with_capacity(CONFIG_KEYS_PREFIX.len() + suffix.len());
    key.put_slice(CONFIG_KEYS_PREFIX);
    key.put_slice(suffix.as_bytes());
    key.freeze()
}

/// Returns the first key that does not start with `prefix`.
///
/// Trailing `0xff` bytes are dropped and the last remaining byte is
/// incremented. A prefix made only of `0xff` bytes has no successor inside
/// the keyspace, so the end of the system keyspace (`\xff\xff`) is returned.
#[must_use]
pub fn strinc(prefix: &[u8]) -> Bytes {
    match prefix.iter().rposition(|&b| b != 0xff) {
        Some(pos) => {
            let mut out = prefix[..=pos].to_vec();
            out[pos] += 1;
            Bytes::from(out)
        }
        None => Bytes::from_static(b"\xff\xff"),
    }
}

/// Renders bytes for humans: printable ASCII as-is, everything else as
/// `\xNN`. Backslashes are doubled.
#[must_use]
pub fn printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            32..=126 => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strinc_increments_last_byte() {
        assert_eq!(&strinc(b"\xff/conf/")[..], b"\xff/conf0");
        assert_eq!(&strinc(b"ab\xff\xff")[..], b"ac");
    }

    #[test]
    fn config_range_covers_prefixed_keys() {
        let range = config_keys();
        assert!(range.contains(&config_key("logs")));
        assert!(range.contains(b"\xff/conf/excluded/10.0.0.1"));
        assert!(!range.contains(b"\xff/confz"));
        assert!(!range.contains(b"\xff/cong"));
    }

    #[test]
    fn intersection_clamps_to_both_ranges() {
        let conf = config_keys();
        let wide = KeyRange::new(&b"\x00"[..], &b"\xff\xff"[..]);
        assert!(wide.intersects(&conf));
        assert_eq!(wide.intersection(&conf), conf);

        let below = KeyRange::new(&b"a"[..], &b"b"[..]);
        assert!(!below.intersects(&conf));
        assert!(below.intersection(&conf).is_empty());
    }

    #[test]
    fn adjacent_ranges_do_not_intersect() {
        let left = KeyRange::new(&b"a"[..], &b"m"[..]);
        let right = KeyRange::new(&b"m"[..], &b"z"[..]);
        assert!(!left.intersects(&right));
    }

    #[test]
    fn printable_escapes_binary() {
        assert_eq!(printable(b"dc1"), "dc1");
        assert_eq!(printable(b"\xff/conf/"), "\\xff/conf/");
        assert_eq!(printable(b"a\\b"), "a\\\\b");
    }
}
