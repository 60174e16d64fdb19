//! Mutation records and their application to a configuration.

use crate::configuration::DatabaseConfiguration;
use crate::fields::ConfigFields;
use crate::keys::{config_keys, printable, KeyRange, CONFIG_KEYS_PREFIX};
use bytes::Bytes;
use tracing::{debug, warn};

/// A change record from the cluster's mutation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Store `value` at `key`.
    SetValue {
        /// Target key.
        key: Bytes,
        /// New value.
        value: Bytes,
    },
    /// Erase every key in `[begin, end)`.
    ClearRange {
        /// Inclusive start.
        begin: Bytes,
        /// Exclusive end.
        end: Bytes,
    },
}

impl Mutation {
    /// Creates a set mutation.
    pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self::SetValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a range clear mutation.
    pub fn clear_range(begin: impl Into<Bytes>, end: impl Into<Bytes>) -> Self {
        Self::ClearRange {
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// Creates a clear of a single key.
    pub fn clear_key(key: impl Into<Bytes>) -> Self {
        let begin: Bytes = key.into();
        let mut end = begin.to_vec();
        end.push(0);
        Self::ClearRange {
            begin,
            end: Bytes::from(end),
        }
    }
}

impl DatabaseConfiguration {
    /// Applies a mutation if it touches the configuration subspace.
    ///
    /// Sets outside the subspace and clears that do not intersect it are
    /// ignored.
    pub fn apply_mutation(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::SetValue { key, value } => {
                if key.starts_with(CONFIG_KEYS_PREFIX) {
                    self.set(key.clone(), value.clone());
                }
            }
            Mutation::ClearRange { begin, end } => {
                let range = KeyRange::new(begin.clone(), end.clone());
                let subspace = config_keys();
                if range.intersects(&subspace) {
                    self.clear(&range.intersection(&subspace));
                }
            }
        }
    }

    /// Stores a raw key/value pair and updates the matching typed field.
    ///
    /// Returns whether the key was recognized. Unrecognized keys are still
    /// stored.
    pub fn set(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> bool {
        let key: Bytes = key.into();
        let value: Bytes = value.into();
        self.store.insert(key.clone(), value.clone());
        let recognized = self.fields.apply_key(&key, &value);
        debug!(key = %printable(&key), recognized, "configuration key set");
        recognized
    }

    /// Erases every key in `range`, then recomputes the typed fields from the
    /// keys that remain.
    ///
    /// Returns true if the configuration was valid before and is not valid
    /// afterwards.
    pub fn clear(&mut self, range: &KeyRange) -> bool {
        let removed = self.store.remove_range(range);
        let was_valid = self.is_valid();
        self.fields = ConfigFields::rebuild(
            &self.knobs,
            self.store.iter().map(|(k, v)| (&k[..], &v[..])),
        );
        let downgraded = was_valid && !self.is_valid();
        debug!(%range, removed, "configuration range cleared");
        if downgraded {
            warn!(
                violation = ?self.fields.violation(),
                "configuration became invalid after clear"
            );
        }
        downgraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::config_key;

    fn initialized() -> DatabaseConfiguration {
        let mut config = DatabaseConfiguration::new();
        config.set(config_key("initialized"), Bytes::new());
        config
    }

    #[test]
    fn set_outside_subspace_ignored() {
        let mut config = initialized();
        config.apply_mutation(&Mutation::set(&b"\xff/other/logs"[..], &b"5"[..]));
        config.apply_mutation(&Mutation::set(&b"logs"[..], &b"5"[..]));
        assert_eq!(config.fields().desired_log_count, -1);
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn set_inside_subspace_applies() {
        let mut config = initialized();
        config.apply_mutation(&Mutation::set(config_key("logs"), &b"5"[..]));
        assert_eq!(config.fields().desired_log_count, 5);
        assert_eq!(&config.get(&config_key("logs")).unwrap()[..], b"5");
    }

    #[test]
    fn unrecognized_key_is_stored() {
        let mut config = initialized();
        assert!(!config.set(config_key("future_option"), &b"1"[..]));
        assert!(config.get(&config_key("future_option")).is_some());
    }

    #[test]
    fn clear_outside_subspace_ignored() {
        let mut config = initialized();
        config.ensure_immutable();
        config.apply_mutation(&Mutation::clear_range(&b"a"[..], &b"b"[..]));
        assert!(config.fields().initialized);
        assert!(!config.is_mutable());
    }

    #[test]
    fn clear_is_clamped_to_subspace() {
        let mut config = initialized();
        config.set(config_key("logs"), &b"4"[..]);
        config.apply_mutation(&Mutation::clear_range(&b"\x00"[..], &b"\xff\xff"[..]));
        assert!(config.is_empty());
        assert_eq!(config.fields(), &ConfigFields::default());
    }

    #[test]
    fn clear_key_rebuilds_fields() {
        let mut config = initialized();
        config.set(config_key("logs"), &b"4"[..]);
        config.set(config_key("proxies"), &b"2"[..]);
        config.apply_mutation(&Mutation::clear_key(config_key("logs")));
        assert_eq!(config.fields().desired_log_count, -1);
        assert_eq!(config.fields().proxy_count, 2);
        assert!(config.fields().initialized);
    }

    #[test]
    fn clear_key_covers_exactly_one_key() {
        let Mutation::ClearRange { begin, end } = Mutation::clear_key(&b"abc"[..]) else {
            panic!("expected a range clear");
        };
        let range = KeyRange::new(begin, end);
        assert!(range.contains(b"abc"));
        assert!(!range.contains(b"abc\x00"));
        assert!(!range.contains(b"abcd"));
    }
}
