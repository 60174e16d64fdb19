//! Property-based test generators using proptest.
//!
//! Provides strategies for configuration keys, mutation streams and
//! complete valid configurations.

use crate::fixtures::{apply_presets, initialized, pairs_of};
use bytes::Bytes;
use clusterconf_core::{
    config_key, AddressExclusion, ConfigKey, ConfigValue, Mutation, Preset, RedundancyMode,
    StorageEngine, CONFIG_KEYS_PREFIX,
};
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

/// Field names the configuration recognizes, plus one exclusion key.
pub const KNOWN_SUFFIXES: [&str; 29] = [
    "initialized",
    "proxies",
    "resolvers",
    "logs",
    "log_replicas",
    "log_anti_quorum",
    "storage_quorum",
    "storage_replicas",
    "log_engine",
    "storage_engine",
    "auto_proxies",
    "auto_resolvers",
    "auto_logs",
    "storage_replication_policy",
    "log_replication_policy",
    "remote_logs",
    "remote_log_replicas",
    "remote_log_policy",
    "satellite_log_policy",
    "satellite_logs",
    "satellite_log_replicas",
    "satellite_anti_quorum",
    "satellite_usable_dcs",
    "primary_dc",
    "remote_dc",
    "primary_satellite_dcs",
    "remote_satellite_dcs",
    "log_routers",
    "excluded/10.0.0.1",
];

/// Strategy for primary redundancy presets.
pub fn redundancy_mode_strategy() -> impl Strategy<Value = RedundancyMode> {
    prop::sample::select(RedundancyMode::ALL.to_vec())
}

/// Strategy for storage engine presets.
pub fn storage_engine_strategy() -> impl Strategy<Value = StorageEngine> {
    prop::sample::select(StorageEngine::ALL.to_vec())
}

/// Strategy for field names, mostly recognized ones.
pub fn config_suffix_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(KNOWN_SUFFIXES.to_vec()).prop_map(str::to_string),
        1 => prop::string::string_regex("[a-z_]{1,16}").expect("Invalid regex"),
    ]
}

/// Strategy for raw values: decimal text, policy-like garbage, or bytes.
pub fn config_value_strategy() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        3 => (-2i32..12).prop_map(|n| Bytes::from(n.to_string())),
        1 => prop::string::string_regex("[ +-]?[0-9]{0,3}[a-z]{0,2}")
            .expect("Invalid regex")
            .prop_map(Bytes::from),
        1 => prop::collection::vec(any::<u8>(), 0..12).prop_map(Bytes::from),
    ]
}

/// Strategy for full keys inside the configuration subspace.
pub fn config_key_strategy() -> impl Strategy<Value = ConfigKey> {
    config_suffix_strategy().prop_map(|suffix| config_key(&suffix))
}

/// Strategy for a single mutation, inside or outside the subspace.
pub fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        6 => (config_key_strategy(), config_value_strategy())
            .prop_map(|(key, value)| Mutation::set(key, value)),
        1 => (prop::string::string_regex("[a-z/]{1,12}").expect("Invalid regex"), config_value_strategy())
            .prop_map(|(key, value)| Mutation::set(Bytes::from(key), value)),
        2 => config_key_strategy().prop_map(|key| Mutation::clear_key(key)),
        1 => (
            prop::collection::vec(any::<u8>(), 0..10),
            prop::collection::vec(any::<u8>(), 0..10),
        )
            .prop_map(|(a, b)| {
                let (begin, end) = if a <= b { (a, b) } else { (b, a) };
                let mut begin_key = CONFIG_KEYS_PREFIX.to_vec();
                begin_key.extend_from_slice(&begin);
                let mut end_key = CONFIG_KEYS_PREFIX.to_vec();
                end_key.extend_from_slice(&end);
                Mutation::clear_range(begin_key, end_key)
            }),
    ]
}

/// Strategy for a sequence of mutations.
pub fn mutation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Mutation>> {
    prop::collection::vec(mutation_strategy(), min_ops..max_ops)
}

/// Strategy for valid exclusions over private IPv4 addresses.
pub fn exclusion_strategy() -> impl Strategy<Value = AddressExclusion> {
    (any::<[u8; 3]>(), prop_oneof![Just(0u16), 1u16..])
        .prop_map(|([b, c, d], port)| {
            let ip = IpAddr::V4(Ipv4Addr::new(10, b, c, d));
            AddressExclusion::process(ip, port)
        })
}

/// Strategy for the stored pairs of a valid single-region configuration,
/// in key order.
pub fn valid_pairs_strategy() -> impl Strategy<Value = Vec<(ConfigKey, ConfigValue)>> {
    (
        redundancy_mode_strategy(),
        storage_engine_strategy(),
        prop::option::of(1i32..20),
        prop::option::of(1i32..20),
        prop::option::of(1i32..8),
    )
        .prop_map(|(mode, engine, logs, proxies, resolvers)| {
            let mut config = initialized();
            apply_presets(
                &mut config,
                &[Preset::Redundancy(mode), Preset::Engine(engine)],
            );
            for (name, count) in [("logs", logs), ("proxies", proxies), ("resolvers", resolvers)]
            {
                if let Some(count) = count {
                    config.set(config_key(name), Bytes::from(count.to_string()));
                }
            }
            pairs_of(&config)
        })
}

/// Strategy for a valid configuration's pairs together with a shuffled
/// copy of the same pairs.
pub fn shuffled_pairs_strategy(
) -> impl Strategy<Value = (Vec<(ConfigKey, ConfigValue)>, Vec<(ConfigKey, ConfigValue)>)> {
    valid_pairs_strategy()
        .prop_flat_map(|pairs| (Just(pairs.clone()), Just(pairs).prop_shuffle()))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
