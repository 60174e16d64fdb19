//! Canonical summary vectors.
//!
//! Each vector is a set of dump-style entries and the summary string and
//! validity they must produce. The vectors serialize to JSON so external
//! tooling can check its own rendering against the same table.

use bytes::Bytes;
use clusterconf_codec::Encode;
use clusterconf_core::{
    config_key, is_policy_key, DatabaseConfiguration, ReplicationPolicy,
};
use serde::{Deserialize, Serialize};

/// A summary test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Field name and value pairs. Policy values are descriptors.
    pub entries: Vec<(String, String)>,
    /// Expected canonical string.
    pub expected: String,
    /// Expected validity.
    pub valid: bool,
}

impl CanonicalVector {
    /// Loads the vector's entries as a configuration snapshot.
    pub fn configuration(&self) -> DatabaseConfiguration {
        let pairs = self.entries.iter().map(|(name, value)| {
            let value = if is_policy_key(name) {
                let policy: ReplicationPolicy = value.parse().expect("Invalid policy descriptor");
                Bytes::from(policy.encode().expect("Failed to encode policy"))
            } else {
                Bytes::from(value.clone())
            };
            (config_key(name), value)
        });
        DatabaseConfiguration::from_key_values(pairs)
    }
}

fn entries(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// All summary vectors.
pub fn canonical_vectors() -> Vec<CanonicalVector> {
    vec![
        CanonicalVector {
            id: "empty".into(),
            description: "Nothing stored".into(),
            entries: Vec::new(),
            expected: String::new(),
            valid: false,
        },
        CanonicalVector {
            id: "uninitialized".into(),
            description: "Fields without the initialized key".into(),
            entries: entries(&[("log_replicas", "3"), ("storage_replicas", "3")]),
            expected: String::new(),
            valid: false,
        },
        CanonicalVector {
            id: "single_memory".into(),
            description: "Single replica, memory engine, defaults filled in".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "1"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "1"),
                ("storage_quorum", "1"),
                ("log_engine", "1"),
                ("storage_engine", "1"),
            ]),
            expected: "redundancy_mode=single;remote_redundancy_mode=none;\
                       satellite_redundancy_mode=none;storage_engine=memory"
                .into(),
            valid: true,
        },
        CanonicalVector {
            id: "triple_ssd2_counts".into(),
            description: "Triple replication with explicit process counts".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "3"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "3"),
                ("storage_quorum", "3"),
                ("log_engine", "2"),
                ("storage_engine", "2"),
                ("logs", "8"),
                ("proxies", "5"),
            ]),
            expected: "logs=8;proxies=5;redundancy_mode=triple;remote_redundancy_mode=none;\
                       satellite_redundancy_mode=none;storage_engine=ssd-2"
                .into(),
            valid: true,
        },
        CanonicalVector {
            id: "custom_quorum".into(),
            description: "Quorum below team size is a custom mode".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "3"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "3"),
                ("storage_quorum", "2"),
                ("log_engine", "0"),
                ("storage_engine", "0"),
            ]),
            expected: "redundancy_mode=custom;remote_redundancy_mode=none;\
                       satellite_redundancy_mode=none;storage_engine=ssd-1"
                .into(),
            valid: true,
        },
        CanonicalVector {
            id: "mixed_engines".into(),
            description: "Different log and storage engines".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "2"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "2"),
                ("storage_quorum", "2"),
                ("log_engine", "2"),
                ("storage_engine", "3"),
            ]),
            expected: "redundancy_mode=double;remote_redundancy_mode=none;\
                       satellite_redundancy_mode=none;storage_engine=custom"
                .into(),
            valid: true,
        },
        CanonicalVector {
            id: "two_regions".into(),
            description: "Primary and remote regions with satellites".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "4"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "6"),
                ("storage_quorum", "6"),
                ("log_engine", "2"),
                ("storage_engine", "2"),
                ("log_replication_policy", "dcid^2 x zoneid^2 x 1"),
                ("storage_replication_policy", "dcid^3 x zoneid^2 x 1"),
                ("remote_log_replicas", "3"),
                ("satellite_log_replicas", "4"),
                ("satellite_usable_dcs", "2"),
                ("satellite_anti_quorum", "2"),
                ("satellite_log_policy", "dcid^2 x zoneid^2 x 1"),
                ("primary_dc", "east"),
                ("remote_dc", "west"),
                ("primary_satellite_dcs", "e1,e2"),
                ("remote_satellite_dcs", "w1,w2"),
            ]),
            expected: "primary_dc=east;primary_satellite_dcs=e1,e2;redundancy_mode=multi_dc;\
                       remote_dc=west;remote_redundancy_mode=remote_triple;\
                       remote_satellite_dcs=w1,w2;satellite_redundancy_mode=two_satellite_fast;\
                       storage_engine=ssd-2"
                .into(),
            valid: true,
        },
        CanonicalVector {
            id: "satellite_lists_differ".into(),
            description: "Satellite datacenter lists of different length".into(),
            entries: entries(&[
                ("initialized", ""),
                ("log_replicas", "3"),
                ("log_anti_quorum", "0"),
                ("storage_replicas", "3"),
                ("storage_quorum", "3"),
                ("log_engine", "2"),
                ("storage_engine", "2"),
                ("primary_satellite_dcs", "a,b"),
                ("remote_satellite_dcs", "c"),
            ]),
            expected: "primary_satellite_dcs=a,b;redundancy_mode=triple;\
                       remote_redundancy_mode=none;remote_satellite_dcs=c;\
                       satellite_redundancy_mode=none;storage_engine=ssd-2"
                .into(),
            valid: false,
        },
    ]
}

/// The vectors as pretty JSON.
pub fn canonical_vectors_json() -> String {
    serde_json::to_string_pretty(&canonical_vectors()).expect("Failed to serialize vectors")
}
