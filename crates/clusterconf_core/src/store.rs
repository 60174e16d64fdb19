//! Backing store for the configuration key/value namespace.
//!
//! The namespace has two physical forms:
//!
//! - [`RawConfiguration`]: a flat vector sorted by key, used for snapshots,
//!   point lookups by binary search and ordered prefix scans.
//! - [`MutableConfiguration`]: an ordered map, used while mutations are being
//!   applied so that inserts and range erases stay cheap.
//!
//! [`NamespaceStore`] holds exactly one of them. Switching forms moves the
//! entries; the old form is gone afterwards, so the two can never disagree.

use crate::error::{CoreError, CoreResult};
use crate::keys::{ConfigKey, ConfigValue, KeyRange};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::trace;

/// Read-optimized snapshot: key/value pairs with strictly increasing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfiguration {
    entries: Vec<(ConfigKey, ConfigValue)>,
}

impl RawConfiguration {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps pairs that are already sorted by key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsortedKeys`] if any key is not strictly greater
    /// than its predecessor.
    pub fn from_sorted(entries: Vec<(ConfigKey, ConfigValue)>) -> CoreResult<Self> {
        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[0].0 >= pair[1].0)
        {
            return Err(CoreError::UnsortedKeys { index: index + 1 });
        }
        Ok(Self { entries })
    }

    /// Builds a snapshot from pairs in any order. Later duplicates win.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, ConfigValue)>,
    {
        MutableConfiguration::from_iter(pairs).into_raw()
    }

    /// Looks up a key by binary search.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&ConfigValue> {
        self.entries
            .binary_search_by(|(k, _)| k[..].cmp(key))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// Iterates the entries inside `range`, in key order.
    pub fn range<'a>(
        &'a self,
        range: &KeyRange,
    ) -> impl Iterator<Item = (&'a ConfigKey, &'a ConfigValue)> + 'a {
        let start = self
            .entries
            .partition_point(|(k, _)| &k[..] < &range.begin[..]);
        let end = range.end.clone();
        self.entries[start..]
            .iter()
            .take_while(move |(k, _)| &k[..] < &end[..])
            .map(|(k, v)| (k, v))
    }

    /// Iterates every entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into the mutable form, consuming the snapshot.
    #[must_use]
    pub fn into_mutable(self) -> MutableConfiguration {
        MutableConfiguration {
            entries: self.entries.into_iter().collect(),
        }
    }
}

/// Write-optimized form: an ordered map used while updates are in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableConfiguration {
    entries: BTreeMap<ConfigKey, ConfigValue>,
}

impl MutableConfiguration {
    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: ConfigKey, value: ConfigValue) {
        self.entries.insert(key, value);
    }

    /// Removes every key inside `range`, returning how many were removed.
    pub fn remove_range(&mut self, range: &KeyRange) -> usize {
        if range.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        let mut tail = self.entries.split_off(&range.begin[..]);
        let mut kept = tail.split_off(&range.end[..]);
        self.entries.append(&mut kept);
        before - self.entries.len()
    }

    /// Iterates the entries inside `range`, in key order.
    pub fn range<'a>(
        &'a self,
        range: &'a KeyRange,
    ) -> impl Iterator<Item = (&'a ConfigKey, &'a ConfigValue)> + 'a {
        // BTreeMap::range panics on inverted bounds
        let end: &[u8] = if range.is_empty() {
            &range.begin[..]
        } else {
            &range.end[..]
        };
        self.entries
            .range::<[u8], _>((Bound::Included(&range.begin[..]), Bound::Excluded(end)))
    }

    /// Iterates every entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into a freshly sorted snapshot, consuming the map.
    #[must_use]
    pub fn into_raw(self) -> RawConfiguration {
        RawConfiguration {
            entries: self.entries.into_iter().collect(),
        }
    }
}

impl FromIterator<(ConfigKey, ConfigValue)> for MutableConfiguration {
    fn from_iter<I: IntoIterator<Item = (ConfigKey, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The configuration namespace in exactly one of its two forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceStore {
    /// Sorted snapshot; no mutation session is open.
    Raw(RawConfiguration),
    /// Ordered map; a mutation session is open.
    Mutable(MutableConfiguration),
}

impl Default for NamespaceStore {
    fn default() -> Self {
        Self::Raw(RawConfiguration::default())
    }
}

impl NamespaceStore {
    /// Returns true while the mutable form is authoritative.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Mutable(_))
    }

    /// Looks up a key in whichever form is current.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&ConfigValue> {
        match self {
            Self::Raw(raw) => raw.get(key),
            Self::Mutable(map) => map.get(key),
        }
    }

    /// Switches to the mutable form. No-op if already mutable.
    pub fn ensure_mutable(&mut self) {
        if let Self::Raw(raw) = self {
            let raw = std::mem::take(raw);
            trace!(entries = raw.len(), "configuration store switched to mutable");
            *self = Self::Mutable(raw.into_mutable());
        }
    }

    /// Switches to the sorted snapshot form. No-op if already raw.
    pub fn ensure_immutable(&mut self) {
        if let Self::Mutable(map) = self {
            let map = std::mem::take(map);
            trace!(entries = map.len(), "configuration store switched to raw");
            *self = Self::Raw(map.into_raw());
        }
    }

    /// Records a value, switching to the mutable form first.
    pub fn insert(&mut self, key: ConfigKey, value: ConfigValue) {
        self.ensure_mutable();
        if let Self::Mutable(map) = self {
            map.insert(key, value);
        }
    }

    /// Erases every key in `range`, switching to the mutable form first.
    pub fn remove_range(&mut self, range: &KeyRange) -> usize {
        self.ensure_mutable();
        match self {
            Self::Mutable(map) => map.remove_range(range),
            Self::Raw(_) => 0,
        }
    }

    /// Iterates every entry in key order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&ConfigKey, &ConfigValue)> + '_> {
        match self {
            Self::Raw(raw) => Box::new(raw.iter()),
            Self::Mutable(map) => Box::new(map.iter()),
        }
    }

    /// Iterates the entries inside `range`, in key order.
    pub fn range<'a>(
        &'a self,
        range: &'a KeyRange,
    ) -> Box<dyn Iterator<Item = (&'a ConfigKey, &'a ConfigValue)> + 'a> {
        match self {
            Self::Raw(raw) => Box::new(raw.range(range)),
            Self::Mutable(map) => Box::new(map.range(range)),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Raw(raw) => raw.len(),
            Self::Mutable(map) => map.len(),
        }
    }

    /// Returns true if the namespace has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn kv(k: &'static str, v: &'static str) -> (ConfigKey, ConfigValue) {
        (Bytes::from_static(k.as_bytes()), Bytes::from_static(v.as_bytes()))
    }

    #[test]
    fn from_sorted_rejects_disorder() {
        let err = RawConfiguration::from_sorted(vec![kv("b", "1"), kv("a", "2")]).unwrap_err();
        assert_eq!(err, CoreError::UnsortedKeys { index: 1 });

        let dup = RawConfiguration::from_sorted(vec![kv("a", "1"), kv("a", "2")]);
        assert!(dup.is_err());
    }

    #[test]
    fn from_pairs_sorts_and_keeps_last() {
        let raw = RawConfiguration::from_pairs(vec![kv("c", "1"), kv("a", "2"), kv("c", "3")]);
        let keys: Vec<_> = raw.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Bytes::from_static(b"a"), Bytes::from_static(b"c")]);
        assert_eq!(&raw.get(b"c").unwrap()[..], b"3");
    }

    #[test]
    fn raw_lookup_misses_absent_key() {
        let raw = RawConfiguration::from_pairs(vec![kv("a", "1"), kv("c", "2")]);
        assert!(raw.get(b"b").is_none());
        assert!(raw.get(b"d").is_none());
    }

    #[test]
    fn mode_switch_is_a_move() {
        let mut store = NamespaceStore::Raw(RawConfiguration::from_pairs(vec![kv("a", "1")]));
        store.ensure_mutable();
        assert!(store.is_mutable());
        store.ensure_mutable();
        assert!(store.is_mutable());
        assert_eq!(&store.get(b"a").unwrap()[..], b"1");

        store.ensure_immutable();
        assert!(!store.is_mutable());
        store.ensure_immutable();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_switches_to_mutable() {
        let mut store = NamespaceStore::default();
        store.insert(Bytes::from_static(b"k"), Bytes::from_static(b"v"));
        assert!(store.is_mutable());
        assert_eq!(&store.get(b"k").unwrap()[..], b"v");
    }

    #[test]
    fn remove_range_is_half_open() {
        let mut store = NamespaceStore::Raw(RawConfiguration::from_pairs(vec![
            kv("a", "1"),
            kv("b", "2"),
            kv("c", "3"),
            kv("d", "4"),
        ]));
        let removed = store.remove_range(&KeyRange::new(&b"b"[..], &b"d"[..]));
        assert_eq!(removed, 2);
        assert!(store.get(b"a").is_some());
        assert!(store.get(b"b").is_none());
        assert!(store.get(b"c").is_none());
        assert!(store.get(b"d").is_some());
    }

    #[test]
    fn inverted_range_removes_nothing() {
        let mut store = NamespaceStore::Raw(RawConfiguration::from_pairs(vec![kv("b", "1")]));
        assert_eq!(store.remove_range(&KeyRange::new(&b"c"[..], &b"a"[..])), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn range_scan_matches_in_both_forms() {
        let pairs = vec![kv("a", "1"), kv("b1", "2"), kv("b2", "3"), kv("c", "4")];
        let range = KeyRange::prefix(b"b");
        let raw = NamespaceStore::Raw(RawConfiguration::from_pairs(pairs.clone()));
        let mut mutable = NamespaceStore::Raw(RawConfiguration::from_pairs(pairs));
        mutable.ensure_mutable();

        let from_raw: Vec<_> = raw.range(&range).map(|(k, _)| k.clone()).collect();
        let from_map: Vec<_> = mutable.range(&range).map(|(k, _)| k.clone()).collect();
        assert_eq!(from_raw, from_map);
        assert_eq!(from_raw.len(), 2);
    }

    proptest! {
        #[test]
        fn round_trip_preserves_lookups(
            pairs in prop::collection::vec(
                (prop::collection::vec(any::<u8>(), 0..6), prop::collection::vec(any::<u8>(), 0..6)),
                0..24,
            ),
            lookups in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..6), 0..16),
        ) {
            let pairs: Vec<(ConfigKey, ConfigValue)> = pairs
                .into_iter()
                .map(|(k, v)| (Bytes::from(k), Bytes::from(v)))
                .collect();
            let mut store = NamespaceStore::Raw(RawConfiguration::from_pairs(pairs.clone()));
            let before: Vec<_> = pairs
                .iter()
                .map(|(k, _)| k.to_vec())
                .chain(lookups.into_iter())
                .map(|k| (store.get(&k).cloned(), k))
                .collect();

            store.ensure_mutable();
            store.ensure_immutable();

            for (value, key) in before {
                prop_assert_eq!(store.get(&key).cloned(), value);
            }
        }
    }
}
