//! Named-mode summary of a configuration.
//!
//! The summary inverts the presets in [`crate::presets`]: a bundle of
//! replica counts, quorums, engines and policy descriptors is matched against
//! a closed set of known shapes. Anything that is not an exact match is
//! reported as `custom`.

use crate::fields::ConfigFields;
use crate::keys::printable;
use crate::policy::ReplicationPolicy;
use crate::types::{StoreType, UNSET};
use std::collections::BTreeMap;

/// Name reported when no preset matches.
pub const CUSTOM: &str = "custom";

/// Descriptor both policies carry in `three_datacenter` mode.
pub const THREE_DATACENTER_DESCRIPTOR: &str = "((dcid^3 x 1) & (zoneid^3 x 1))";

/// Log policy descriptor in `three_data_hall` mode.
pub const THREE_DATA_HALL_LOG_DESCRIPTOR: &str = "data_hall^2 x zoneid^2 x 1";

/// Storage policy descriptor in `three_data_hall` mode.
pub const THREE_DATA_HALL_STORAGE_DESCRIPTOR: &str = "data_hall^3 x 1";

/// Log policy descriptor in `multi_dc` mode.
pub const MULTI_DC_LOG_DESCRIPTOR: &str = "dcid^2 x zoneid^2 x 1";

/// Storage policy descriptor in `multi_dc` mode.
pub const MULTI_DC_STORAGE_DESCRIPTOR: &str = "dcid^3 x zoneid^2 x 1";

fn descriptor(policy: Option<&ReplicationPolicy>) -> String {
    policy.map(ReplicationPolicy::describe).unwrap_or_default()
}

impl ConfigFields {
    /// Name of the primary redundancy mode.
    #[must_use]
    pub fn redundancy_mode(&self) -> &'static str {
        if self.durable_storage_quorum != self.storage_team_size || self.log_write_anti_quorum != 0
        {
            return CUSTOM;
        }
        let log = descriptor(self.log_policy.as_ref());
        let storage = descriptor(self.storage_policy.as_ref());

        match (self.log_replication_factor, self.durable_storage_quorum) {
            (1, 1) => "single",
            (2, 2) => "double",
            (3, 3)
                if log == THREE_DATACENTER_DESCRIPTOR
                    && storage == THREE_DATACENTER_DESCRIPTOR =>
            {
                "three_datacenter"
            }
            (3, 3) => "triple",
            (4, 3)
                if log == THREE_DATA_HALL_LOG_DESCRIPTOR
                    && storage == THREE_DATA_HALL_STORAGE_DESCRIPTOR =>
            {
                "three_data_hall"
            }
            (4, 6) if log == MULTI_DC_LOG_DESCRIPTOR && storage == MULTI_DC_STORAGE_DESCRIPTOR => {
                "multi_dc"
            }
            _ => CUSTOM,
        }
    }

    /// Name of the storage engine pair.
    #[must_use]
    pub fn storage_engine_mode(&self) -> &'static str {
        match (self.log_store_type, self.storage_store_type) {
            (StoreType::SsdBtreeV1, StoreType::SsdBtreeV1) => "ssd-1",
            (StoreType::SsdBtreeV2, StoreType::SsdBtreeV2) => "ssd-2",
            (StoreType::Memory, StoreType::Memory) => "memory",
            _ => CUSTOM,
        }
    }

    /// Name of the satellite redundancy mode.
    #[must_use]
    pub fn satellite_redundancy_mode(&self) -> &'static str {
        match (
            self.satellite_log_replication_factor,
            self.satellite_log_usable_dcs,
            self.satellite_log_write_anti_quorum,
        ) {
            (1, 1, 0) => "one_satellite_single",
            (2, 1, 0) => "one_satellite_double",
            (3, 1, 0) => "one_satellite_triple",
            (4, 2, 0) => "two_satellite_safe",
            (4, 2, 2) => "two_satellite_fast",
            (0, _, _) => "none",
            _ => CUSTOM,
        }
    }

    /// Name of the remote redundancy mode.
    #[must_use]
    pub fn remote_redundancy_mode(&self) -> &'static str {
        match self.remote_log_replication_factor {
            0 => "none",
            1 => "remote_single",
            2 => "remote_double",
            3 => "remote_triple",
            _ => CUSTOM,
        }
    }

    /// Builds the human-oriented summary map.
    ///
    /// Returns an empty map until the configuration is initialized.
    #[must_use]
    pub fn to_canonical_map(&self) -> BTreeMap<String, String> {
        let mut result = BTreeMap::new();
        if !self.initialized {
            return result;
        }

        let mut put = |key: &str, value: String| {
            result.insert(key.to_string(), value);
        };

        put("redundancy_mode", self.redundancy_mode().to_string());
        put("storage_engine", self.storage_engine_mode().to_string());

        if let Some(dc) = &self.primary_dc_id {
            put("primary_dc", printable(dc));
        }
        if let Some(dc) = &self.remote_dc_id {
            put("remote_dc", printable(dc));
        }
        if !self.primary_satellite_dc_ids.is_empty() {
            put(
                "primary_satellite_dcs",
                join_ids(&self.primary_satellite_dc_ids),
            );
        }
        if !self.remote_satellite_dc_ids.is_empty() {
            put(
                "remote_satellite_dcs",
                join_ids(&self.remote_satellite_dc_ids),
            );
        }

        put(
            "satellite_redundancy_mode",
            self.satellite_redundancy_mode().to_string(),
        );
        put(
            "remote_redundancy_mode",
            self.remote_redundancy_mode().to_string(),
        );

        for (key, count) in [
            ("logs", self.desired_log_count),
            ("remote_logs", self.remote_desired_log_count),
            ("satellite_logs", self.satellite_desired_log_count),
            ("proxies", self.proxy_count),
            ("resolvers", self.resolver_count),
        ] {
            if count != UNSET {
                put(key, count.to_string());
            }
        }

        result
    }

    /// Renders the summary map as `key=value` pairs joined by `;`.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        self.to_canonical_map()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn join_ids(ids: &[bytes::Bytes]) -> String {
    ids.iter()
        .map(|id| printable(id))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DATA_HALL, DC_ID};
    use bytes::Bytes;

    fn base(replicas: i32, quorum: i32, team: i32) -> ConfigFields {
        let mut f = ConfigFields::default();
        f.initialized = true;
        f.log_write_anti_quorum = 0;
        f.log_replication_factor = replicas;
        f.durable_storage_quorum = quorum;
        f.storage_team_size = team;
        f
    }

    #[test]
    fn uninitialized_is_empty() {
        let f = ConfigFields::default();
        assert!(f.to_canonical_map().is_empty());
        assert_eq!(f.to_canonical_string(), "");
    }

    #[test]
    fn simple_modes() {
        assert_eq!(base(1, 1, 1).redundancy_mode(), "single");
        assert_eq!(base(2, 2, 2).redundancy_mode(), "double");
        assert_eq!(base(3, 3, 3).redundancy_mode(), "triple");
        assert_eq!(base(5, 5, 5).redundancy_mode(), CUSTOM);
    }

    #[test]
    fn quorum_and_anti_quorum_force_custom() {
        assert_eq!(base(3, 2, 3).redundancy_mode(), CUSTOM);
        let mut f = base(3, 3, 3);
        f.log_write_anti_quorum = 1;
        assert_eq!(f.redundancy_mode(), CUSTOM);
    }

    #[test]
    fn three_datacenter_needs_both_descriptors() {
        let policy = ReplicationPolicy::And(vec![
            ReplicationPolicy::across(3, DC_ID, ReplicationPolicy::One),
            ReplicationPolicy::across_zones(3),
        ]);
        let mut f = base(3, 3, 3);
        f.log_policy = Some(policy.clone());
        assert_eq!(f.redundancy_mode(), "triple");
        f.storage_policy = Some(policy);
        assert_eq!(f.redundancy_mode(), "three_datacenter");
    }

    #[test]
    fn three_data_hall_shape() {
        let mut f = base(4, 3, 3);
        assert_eq!(f.redundancy_mode(), CUSTOM);
        f.log_policy = Some(ReplicationPolicy::across(
            2,
            DATA_HALL,
            ReplicationPolicy::across_zones(2),
        ));
        f.storage_policy = Some(ReplicationPolicy::across(3, DATA_HALL, ReplicationPolicy::One));
        assert_eq!(f.redundancy_mode(), "three_data_hall");
    }

    #[test]
    fn multi_dc_shape() {
        let mut f = base(4, 6, 6);
        f.log_policy = Some(ReplicationPolicy::across(
            2,
            DC_ID,
            ReplicationPolicy::across_zones(2),
        ));
        f.storage_policy = Some(ReplicationPolicy::across(
            3,
            DC_ID,
            ReplicationPolicy::across_zones(2),
        ));
        assert_eq!(f.redundancy_mode(), "multi_dc");

        f.storage_policy = Some(ReplicationPolicy::across_zones(6));
        assert_eq!(f.redundancy_mode(), CUSTOM);
    }

    #[test]
    fn engines() {
        let mut f = base(1, 1, 1);
        assert_eq!(f.storage_engine_mode(), CUSTOM);
        f.log_store_type = StoreType::Memory;
        f.storage_store_type = StoreType::Memory;
        assert_eq!(f.storage_engine_mode(), "memory");
        f.storage_store_type = StoreType::SsdBtreeV2;
        assert_eq!(f.storage_engine_mode(), CUSTOM);
        f.log_store_type = StoreType::SsdBtreeV2;
        assert_eq!(f.storage_engine_mode(), "ssd-2");
        f.log_store_type = StoreType::SsdRedwoodV1;
        f.storage_store_type = StoreType::SsdRedwoodV1;
        assert_eq!(f.storage_engine_mode(), CUSTOM);
    }

    #[test]
    fn satellite_modes() {
        let mut f = base(3, 3, 3);
        let cases = [
            ((1, 1, 0), "one_satellite_single"),
            ((2, 1, 0), "one_satellite_double"),
            ((3, 1, 0), "one_satellite_triple"),
            ((4, 2, 0), "two_satellite_safe"),
            ((4, 2, 2), "two_satellite_fast"),
            ((0, 0, 0), "none"),
            ((0, 3, 1), "none"),
            ((4, 2, 1), CUSTOM),
            ((2, 2, 0), CUSTOM),
        ];
        for ((replicas, usable, anti), expected) in cases {
            f.satellite_log_replication_factor = replicas;
            f.satellite_log_usable_dcs = usable;
            f.satellite_log_write_anti_quorum = anti;
            assert_eq!(f.satellite_redundancy_mode(), expected);
        }
    }

    #[test]
    fn remote_modes() {
        let mut f = base(3, 3, 3);
        for (replicas, expected) in [
            (0, "none"),
            (1, "remote_single"),
            (2, "remote_double"),
            (3, "remote_triple"),
            (4, CUSTOM),
        ] {
            f.remote_log_replication_factor = replicas;
            assert_eq!(f.remote_redundancy_mode(), expected);
        }
    }

    #[test]
    fn counts_appear_only_when_set() {
        let mut f = base(3, 3, 3);
        let map = f.to_canonical_map();
        assert!(!map.contains_key("logs"));
        assert!(!map.contains_key("proxies"));

        f.desired_log_count = 6;
        f.satellite_desired_log_count = 2;
        let map = f.to_canonical_map();
        assert_eq!(map.get("logs").map(String::as_str), Some("6"));
        assert_eq!(map.get("satellite_logs").map(String::as_str), Some("2"));
        assert!(!map.contains_key("remote_logs"));
        assert!(!map.contains_key("resolvers"));
    }

    #[test]
    fn datacenters_rendered() {
        let mut f = base(3, 3, 3);
        f.primary_dc_id = Some(Bytes::from_static(b"dc1"));
        f.remote_dc_id = Some(Bytes::from_static(b"dc\x01"));
        f.primary_satellite_dc_ids = vec![Bytes::from_static(b"s1"), Bytes::from_static(b"s2")];
        f.remote_satellite_dc_ids = vec![Bytes::from_static(b"s3"), Bytes::from_static(b"s4")];
        let map = f.to_canonical_map();
        assert_eq!(map["primary_dc"], "dc1");
        assert_eq!(map["remote_dc"], "dc\\x01");
        assert_eq!(map["primary_satellite_dcs"], "s1,s2");
        assert_eq!(map["remote_satellite_dcs"], "s3,s4");
    }

    #[test]
    fn string_form_is_sorted_and_unterminated() {
        let mut f = base(1, 1, 1);
        f.proxy_count = 2;
        assert_eq!(
            f.to_canonical_string(),
            "proxies=2;redundancy_mode=single;remote_redundancy_mode=none;\
             satellite_redundancy_mode=none;storage_engine=custom"
        );
    }
}
