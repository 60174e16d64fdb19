//! Typed configuration fields and the key-to-field mapping.
//!
//! Every recognized configuration key feeds exactly one field. Parsing is
//! lenient by design of the persisted format: malformed integers become 0,
//! unknown engine codes become [`StoreType::Unset`] and undecodable policy
//! blobs leave the slot empty. Each coercion is logged.

use crate::keys::{ConfigValue, CONFIG_KEYS_PREFIX};
use crate::knobs::ConfigKnobs;
use crate::policy::ReplicationPolicy;
use crate::types::{StoreType, UNSET};
use clusterconf_codec::Decode;
use tracing::warn;

/// Field names that hold serialized replication policies.
pub const POLICY_KEYS: [&str; 4] = [
    "storage_replication_policy",
    "log_replication_policy",
    "remote_log_policy",
    "satellite_log_policy",
];

/// Returns true if `suffix` names a policy field.
#[must_use]
pub fn is_policy_key(suffix: &str) -> bool {
    POLICY_KEYS.contains(&suffix)
}

/// The typed view of the configuration namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFields {
    /// Set once the `initialized` key has been seen.
    pub initialized: bool,

    /// Explicit proxy count, or [`UNSET`].
    pub proxy_count: i32,
    /// Proxy count used while `proxy_count` is unset.
    pub auto_proxy_count: i32,
    /// Explicit resolver count, or [`UNSET`].
    pub resolver_count: i32,
    /// Resolver count used while `resolver_count` is unset.
    pub auto_resolver_count: i32,
    /// Explicit transaction log count, or [`UNSET`].
    pub desired_log_count: i32,
    /// Log count used while `desired_log_count` is unset.
    pub auto_desired_log_count: i32,

    /// Log replicas allowed to miss a commit.
    pub log_write_anti_quorum: i32,
    /// Copies of each mutation kept by transaction logs.
    pub log_replication_factor: i32,
    /// Storage replicas that must acknowledge durability.
    pub durable_storage_quorum: i32,
    /// Storage servers per team.
    pub storage_team_size: i32,

    /// Engine for transaction logs.
    pub log_store_type: StoreType,
    /// Engine for storage servers.
    pub storage_store_type: StoreType,

    /// Placement of transaction log replicas.
    pub log_policy: Option<ReplicationPolicy>,
    /// Placement of storage replicas.
    pub storage_policy: Option<ReplicationPolicy>,

    /// Explicit remote-region log count, or [`UNSET`].
    pub remote_desired_log_count: i32,
    /// Remote-region log replicas; 0 disables the remote region.
    pub remote_log_replication_factor: i32,
    /// Placement of remote-region log replicas.
    pub remote_log_policy: Option<ReplicationPolicy>,

    /// Explicit satellite log count, or [`UNSET`].
    pub satellite_desired_log_count: i32,
    /// Satellite log replicas; 0 disables satellites.
    pub satellite_log_replication_factor: i32,
    /// Satellite replicas allowed to miss a commit.
    pub satellite_log_write_anti_quorum: i32,
    /// Satellite datacenters usable at once.
    pub satellite_log_usable_dcs: i32,
    /// Placement of satellite log replicas.
    pub satellite_log_policy: Option<ReplicationPolicy>,

    /// Explicit log router count, or [`UNSET`].
    pub desired_log_router_count: i32,

    /// Primary datacenter.
    pub primary_dc_id: Option<ConfigValue>,
    /// Remote datacenter.
    pub remote_dc_id: Option<ConfigValue>,
    /// Satellites of the primary datacenter, paired by index with
    /// `remote_satellite_dc_ids`.
    pub primary_satellite_dc_ids: Vec<ConfigValue>,
    /// Satellites of the remote datacenter.
    pub remote_satellite_dc_ids: Vec<ConfigValue>,
}

impl Default for ConfigFields {
    fn default() -> Self {
        Self::reset(&ConfigKnobs::default())
    }
}

impl ConfigFields {
    /// Returns the reset state: nothing configured, auto counts from `knobs`.
    #[must_use]
    pub fn reset(knobs: &ConfigKnobs) -> Self {
        Self {
            initialized: false,
            proxy_count: UNSET,
            auto_proxy_count: knobs.default_auto_proxies,
            resolver_count: UNSET,
            auto_resolver_count: knobs.default_auto_resolvers,
            desired_log_count: UNSET,
            auto_desired_log_count: knobs.default_auto_logs,
            log_write_anti_quorum: UNSET,
            log_replication_factor: UNSET,
            durable_storage_quorum: UNSET,
            storage_team_size: UNSET,
            log_store_type: StoreType::Unset,
            storage_store_type: StoreType::Unset,
            log_policy: None,
            storage_policy: None,
            remote_desired_log_count: UNSET,
            remote_log_replication_factor: 0,
            remote_log_policy: None,
            satellite_desired_log_count: UNSET,
            satellite_log_replication_factor: 0,
            satellite_log_write_anti_quorum: 0,
            satellite_log_usable_dcs: 0,
            satellite_log_policy: None,
            desired_log_router_count: UNSET,
            primary_dc_id: None,
            remote_dc_id: None,
            primary_satellite_dc_ids: Vec::new(),
            remote_satellite_dc_ids: Vec::new(),
        }
    }

    /// Replays `entries` on top of the reset state.
    ///
    /// The result depends only on the entries, so callers can recompute
    /// the typed view from the namespace at any time.
    pub fn rebuild<'a, I>(knobs: &ConfigKnobs, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut fields = Self::reset(knobs);
        for (key, value) in entries {
            fields.apply_key(key, value);
        }
        fields
    }

    /// Applies one key to the matching field.
    ///
    /// `key` may be the full key or the bare field name; the subspace prefix
    /// is stripped if present. Returns false, touching nothing, if the name
    /// is not recognized.
    pub fn apply_key(&mut self, key: &[u8], value: &[u8]) -> bool {
        let suffix = key.strip_prefix(CONFIG_KEYS_PREFIX).unwrap_or(key);
        let Ok(name) = std::str::from_utf8(suffix) else {
            return false;
        };

        match name {
            "initialized" => self.initialized = true,
            "proxies" => self.proxy_count = parse_int(name, value),
            "resolvers" => self.resolver_count = parse_int(name, value),
            "logs" => self.desired_log_count = parse_int(name, value),
            "log_replicas" => self.log_replication_factor = parse_int(name, value),
            "log_anti_quorum" => self.log_write_anti_quorum = parse_int(name, value),
            "storage_quorum" => self.durable_storage_quorum = parse_int(name, value),
            "storage_replicas" => self.storage_team_size = parse_int(name, value),
            "log_engine" => self.log_store_type = parse_store_type(name, value),
            "storage_engine" => self.storage_store_type = parse_store_type(name, value),
            "auto_proxies" => self.auto_proxy_count = parse_int(name, value),
            "auto_resolvers" => self.auto_resolver_count = parse_int(name, value),
            "auto_logs" => self.auto_desired_log_count = parse_int(name, value),
            "storage_replication_policy" => self.storage_policy = parse_policy(name, value),
            "log_replication_policy" => self.log_policy = parse_policy(name, value),
            "remote_logs" => self.remote_desired_log_count = parse_int(name, value),
            "remote_log_replicas" => self.remote_log_replication_factor = parse_int(name, value),
            "remote_log_policy" => self.remote_log_policy = parse_policy(name, value),
            "satellite_log_policy" => self.satellite_log_policy = parse_policy(name, value),
            "satellite_logs" => self.satellite_desired_log_count = parse_int(name, value),
            "satellite_log_replicas" => {
                self.satellite_log_replication_factor = parse_int(name, value);
            }
            "satellite_anti_quorum" => {
                self.satellite_log_write_anti_quorum = parse_int(name, value);
            }
            "satellite_usable_dcs" => self.satellite_log_usable_dcs = parse_int(name, value),
            "primary_dc" => self.primary_dc_id = Some(ConfigValue::copy_from_slice(value)),
            "remote_dc" => self.remote_dc_id = Some(ConfigValue::copy_from_slice(value)),
            "primary_satellite_dcs" => self.primary_satellite_dc_ids = parse_dc_list(value),
            "remote_satellite_dcs" => self.remote_satellite_dc_ids = parse_dc_list(value),
            "log_routers" => self.desired_log_router_count = parse_int(name, value),
            _ => return false,
        }
        true
    }

    /// Proxies to recruit: the explicit count, else the automatic one.
    #[must_use]
    pub fn desired_proxies(&self) -> i32 {
        explicit_or(self.proxy_count, self.auto_proxy_count)
    }

    /// Resolvers to recruit.
    #[must_use]
    pub fn desired_resolvers(&self) -> i32 {
        explicit_or(self.resolver_count, self.auto_resolver_count)
    }

    /// Transaction logs to recruit in the primary region.
    #[must_use]
    pub fn desired_logs(&self) -> i32 {
        explicit_or(self.desired_log_count, self.auto_desired_log_count)
    }

    /// Transaction logs in the remote region; defaults to [`Self::desired_logs`].
    #[must_use]
    pub fn desired_remote_logs(&self) -> i32 {
        explicit_or(self.remote_desired_log_count, self.desired_logs())
    }

    /// Satellite transaction logs; defaults to [`Self::desired_logs`].
    #[must_use]
    pub fn desired_satellite_logs(&self) -> i32 {
        explicit_or(self.satellite_desired_log_count, self.desired_logs())
    }

    /// Log routers; defaults to [`Self::desired_remote_logs`].
    #[must_use]
    pub fn desired_log_routers(&self) -> i32 {
        explicit_or(self.desired_log_router_count, self.desired_remote_logs())
    }

    /// Fills empty policy slots with `zoneid^N x 1` policies sized from the
    /// matching replica counts. Remote and satellite slots are only filled
    /// when their region is enabled.
    pub fn set_default_replication_policy(&mut self) {
        if self.storage_policy.is_none() {
            self.storage_policy = Some(zone_policy(self.storage_team_size));
        }
        if self.log_policy.is_none() {
            self.log_policy = Some(zone_policy(self.log_replication_factor));
        }
        if self.remote_log_replication_factor > 0 && self.remote_log_policy.is_none() {
            self.remote_log_policy = Some(zone_policy(self.remote_log_replication_factor));
        }
        if self.satellite_log_replication_factor > 0 && self.satellite_log_policy.is_none() {
            self.satellite_log_policy = Some(zone_policy(self.satellite_log_replication_factor));
        }
    }
}

const fn explicit_or(explicit: i32, fallback: i32) -> i32 {
    if explicit == UNSET {
        fallback
    } else {
        explicit
    }
}

fn zone_policy(count: i32) -> ReplicationPolicy {
    ReplicationPolicy::across_zones(u32::try_from(count).unwrap_or(0))
}

/// Parses an integer the way C's `atoi` does: optional leading whitespace,
/// an optional sign, then as many digits as are present. Anything else
/// yields 0. Values out of `i32` range saturate.
#[must_use]
pub fn parse_int_lenient(value: &[u8]) -> i32 {
    let mut rest = value;
    while let [b, tail @ ..] = rest {
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c) {
            rest = tail;
        } else {
            break;
        }
    }
    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut magnitude: i64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        magnitude = (magnitude * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

fn parse_int(name: &str, value: &[u8]) -> i32 {
    if let Some(parsed) = std::str::from_utf8(value)
        .ok()
        .and_then(|text| text.parse::<i32>().ok())
    {
        return parsed;
    }
    let coerced = parse_int_lenient(value);
    warn!(
        field = name,
        value = %String::from_utf8_lossy(value),
        coerced,
        "malformed integer in configuration"
    );
    coerced
}

fn parse_store_type(name: &str, value: &[u8]) -> StoreType {
    let code = parse_int(name, value);
    StoreType::from_code(code).unwrap_or_else(|| {
        warn!(field = name, code, "unknown storage engine code");
        StoreType::Unset
    })
}

fn parse_policy(name: &str, value: &[u8]) -> Option<ReplicationPolicy> {
    match ReplicationPolicy::decode(value) {
        Ok(policy) => Some(policy),
        Err(e) => {
            warn!(field = name, error = %e, "undecodable replication policy");
            None
        }
    }
}

/// Splits a comma-separated datacenter list. Empty segments, including a
/// trailing one, are kept.
#[must_use]
pub fn parse_dc_list(value: &[u8]) -> Vec<ConfigValue> {
    value
        .split(|&b| b == b',')
        .map(ConfigValue::copy_from_slice)
        .collect()
}
