//! The database configuration aggregate.

use crate::exclusion::AddressExclusion;
use crate::fields::ConfigFields;
use crate::keys::{excluded_servers_keys, printable, ConfigKey, ConfigValue};
use crate::knobs::ConfigKnobs;
use crate::store::{NamespaceStore, RawConfiguration};
use crate::validate::Violation;
use clusterconf_codec::{from_versioned_bytes, to_versioned_bytes, CodecResult, Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::SocketAddr;
use tracing::trace;

/// Typed, validated view of the cluster's configuration subspace.
///
/// The configuration keeps the raw key/value namespace alongside the typed
/// fields derived from it. All changes go through [`Self::apply_mutation`],
/// [`Self::set`] or [`Self::clear`]; the typed fields are always a function of
/// the stored keys.
///
/// # Example
///
/// ```
/// use clusterconf_core::{config_key, DatabaseConfiguration, Mutation};
///
/// let mut config = DatabaseConfiguration::new();
/// config.apply_mutation(&Mutation::set(config_key("initialized"), ""));
/// config.apply_mutation(&Mutation::set(config_key("logs"), "6"));
/// assert_eq!(config.fields().desired_logs(), 6);
/// assert!(!config.is_valid());
/// ```
#[derive(Clone)]
pub struct DatabaseConfiguration {
    pub(crate) fields: ConfigFields,
    pub(crate) store: NamespaceStore,
    pub(crate) knobs: ConfigKnobs,
}

impl Default for DatabaseConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseConfiguration {
    /// Creates an empty, uninitialized configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_knobs(ConfigKnobs::default())
    }

    /// Creates an empty configuration with custom automatic counts.
    #[must_use]
    pub fn with_knobs(knobs: ConfigKnobs) -> Self {
        Self {
            fields: ConfigFields::reset(&knobs),
            store: NamespaceStore::default(),
            knobs,
        }
    }

    /// Loads a persisted snapshot of the configuration subspace.
    ///
    /// Pairs may arrive in any order. Missing replication policies are filled
    /// with zone-spread defaults.
    pub fn from_key_values<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, ConfigValue)>,
    {
        Self::from_key_values_with_knobs(pairs, ConfigKnobs::default())
    }

    /// Like [`Self::from_key_values`], with custom automatic counts.
    pub fn from_key_values_with_knobs<I>(pairs: I, knobs: ConfigKnobs) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, ConfigValue)>,
    {
        let raw = RawConfiguration::from_pairs(pairs);
        let mut fields = ConfigFields::rebuild(&knobs, raw.iter().map(|(k, v)| (&k[..], &v[..])));
        fields.set_default_replication_policy();
        trace!(entries = raw.len(), "configuration loaded from snapshot");
        Self {
            fields,
            store: NamespaceStore::Raw(raw),
            knobs,
        }
    }

    /// The typed fields.
    #[must_use]
    pub fn fields(&self) -> &ConfigFields {
        &self.fields
    }

    /// The knobs used for automatic counts.
    #[must_use]
    pub fn knobs(&self) -> &ConfigKnobs {
        &self.knobs
    }

    /// Looks up a raw value by full key.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&ConfigValue> {
        self.store.get(key)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterates stored pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.store.iter()
    }

    /// Returns true while a mutation session holds the map form.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.store.is_mutable()
    }

    /// Switches the backing store to the mutable form.
    pub fn ensure_mutable(&mut self) {
        self.store.ensure_mutable();
    }

    /// Switches the backing store to the sorted snapshot form.
    pub fn ensure_immutable(&mut self) {
        self.store.ensure_immutable();
    }

    /// Returns the sorted snapshot of every stored pair.
    #[must_use]
    pub fn raw_configuration(&self) -> RawConfiguration {
        match &self.store {
            NamespaceStore::Raw(raw) => raw.clone(),
            NamespaceStore::Mutable(map) => map.clone().into_raw(),
        }
    }

    /// Returns true if every validity rule holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.is_valid()
    }

    /// Returns the first broken validity rule, if any.
    #[must_use]
    pub fn violation(&self) -> Option<Violation> {
        self.fields.violation()
    }

    /// Fills empty replication policy slots with zone-spread defaults.
    pub fn set_default_replication_policy(&mut self) {
        self.fields.set_default_replication_policy();
    }

    /// Named-mode summary; empty until initialized.
    #[must_use]
    pub fn to_canonical_map(&self) -> BTreeMap<String, String> {
        self.fields.to_canonical_map()
    }

    /// Every valid exclusion stored under the exclusion prefix.
    ///
    /// Keys that do not decode to a valid address are skipped.
    #[must_use]
    pub fn get_excluded_servers(&self) -> BTreeSet<AddressExclusion> {
        let range = excluded_servers_keys();
        self.store
            .range(&range)
            .filter_map(|(key, _)| match AddressExclusion::from_key(key) {
                Ok(exclusion) if exclusion.is_valid() => Some(exclusion),
                _ => {
                    trace!(key = %printable(key), "skipping malformed exclusion");
                    None
                }
            })
            .collect()
    }

    /// Returns true if the process at `addr`, or its whole machine, is
    /// excluded.
    #[must_use]
    pub fn is_excluded_server(&self, addr: SocketAddr) -> bool {
        self.get(&AddressExclusion::from(addr).to_key()).is_some()
            || self
                .get(&AddressExclusion::machine(addr.ip()).to_key())
                .is_some()
    }
}

impl fmt::Display for DatabaseConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.to_canonical_string())
    }
}

impl fmt::Debug for DatabaseConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfiguration")
            .field("summary", &self.fields.to_canonical_string())
            .field("entries", &self.store.len())
            .field("mutable", &self.store.is_mutable())
            .finish_non_exhaustive()
    }
}

/// Two configurations are equal when they store the same pairs, whatever
/// their current representation.
impl PartialEq for DatabaseConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.store.iter().eq(other.store.iter())
    }
}

impl Eq for DatabaseConfiguration {}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    entries: Vec<(ConfigKey, ConfigValue)>,
}

impl Encode for DatabaseConfiguration {
    /// Persists only the raw pairs; the typed fields are derived on load.
    fn encode(&self) -> CodecResult<Vec<u8>> {
        let snapshot = Snapshot {
            entries: self
                .store
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        to_versioned_bytes(&snapshot)
    }
}

impl Decode for DatabaseConfiguration {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let snapshot: Snapshot = from_versioned_bytes(bytes)?;
        Ok(Self::from_key_values(snapshot.entries))
    }
}
