//! # ClusterConf Core
//!
//! Typed, validated configuration model for a replicated storage cluster.
//!
//! The cluster stores its configuration as raw key/value pairs under the
//! `\xff/conf/` subspace. This crate provides:
//! - A dual-form namespace store (sorted snapshot or mutable map)
//! - Typed configuration fields derived from the stored keys
//! - Mutation application with range clamping and full rebuild on clear
//! - Cross-field validity rules
//! - Canonical named-mode summaries
//! - Server exclusion lookups
//! - Replication policies and preset settings

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod canonical;
mod configuration;
mod error;
mod exclusion;
mod fields;
mod keys;
mod knobs;
mod mutation;
mod policy;
mod presets;
mod store;
mod types;
mod validate;

pub use canonical::CUSTOM;
pub use configuration::DatabaseConfiguration;
pub use error::{CoreError, CoreResult};
pub use exclusion::AddressExclusion;
pub use fields::{is_policy_key, parse_dc_list, parse_int_lenient, ConfigFields, POLICY_KEYS};
pub use keys::{
    config_key, config_keys, excluded_servers_keys, printable, strinc, ConfigKey, ConfigValue,
    KeyRange, CONFIG_KEYS_PREFIX, EXCLUDED_SERVERS_PREFIX,
};
pub use knobs::ConfigKnobs;
pub use mutation::Mutation;
pub use policy::{ReplicationPolicy, DATA_HALL, DC_ID, ZONE_ID};
pub use presets::{
    ConfigSetting, Preset, RedundancyMode, RemoteRedundancyMode, SatelliteRedundancyMode,
    SettingValue, StorageEngine,
};
pub use store::{MutableConfiguration, NamespaceStore, RawConfiguration};
pub use types::{StoreType, UNSET};
pub use validate::Violation;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
