//! Cross-field validity rules.
//!
//! Validity is advisory: mutations are applied regardless, and callers poll
//! [`ConfigFields::is_valid`] afterwards. Nothing here is cached.

use crate::fields::ConfigFields;
use thiserror::Error;

/// The first rule a configuration breaks.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The `initialized` key has not been written.
    #[error("configuration is not initialized")]
    NotInitialized,
    /// A count that must be at least `min` is below it.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Offending field.
        field: &'static str,
        /// Smallest accepted value.
        min: i32,
        /// Current value.
        value: i32,
    },
    /// Storage quorum exceeds the team size.
    #[error("storage quorum {quorum} exceeds team size {team_size}")]
    QuorumExceedsTeam {
        /// Durable storage quorum.
        quorum: i32,
        /// Storage team size.
        team_size: i32,
    },
    /// A storage engine is not configured.
    #[error("{0} storage engine is not set")]
    EngineUnset(&'static str),
    /// A required replication policy is missing.
    #[error("{0} replication policy is missing")]
    PolicyMissing(&'static str),
    /// Remote replication is on but its prerequisites are not all present.
    #[error("remote logs are enabled without {0}")]
    RemoteIncomplete(&'static str),
    /// Exactly one of primary and remote datacenter is configured.
    #[error("primary and remote datacenter must be set together")]
    DatacenterMismatch,
    /// Satellite replication is on but its prerequisites are not all present.
    #[error("satellite logs are enabled without {0}")]
    SatelliteIncomplete(&'static str),
    /// Satellite datacenter lists differ in length.
    #[error("satellite datacenter lists differ in length ({primary} vs {remote})")]
    SatelliteListMismatch {
        /// Entries in the primary list.
        primary: usize,
        /// Entries in the remote list.
        remote: usize,
    },
}

fn at_least(field: &'static str, value: i32, min: i32) -> Result<(), Violation> {
    if value >= min {
        Ok(())
    } else {
        Err(Violation::BelowMinimum { field, min, value })
    }
}

fn require(condition: bool, violation: Violation) -> Result<(), Violation> {
    if condition {
        Ok(())
    } else {
        Err(violation)
    }
}

impl ConfigFields {
    /// Returns true if every validity rule holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Returns the first broken rule, if any.
    #[must_use]
    pub fn violation(&self) -> Option<Violation> {
        self.check().err()
    }

    fn check(&self) -> Result<(), Violation> {
        require(self.initialized, Violation::NotInitialized)?;

        at_least("log_anti_quorum", self.log_write_anti_quorum, 0)?;
        at_least("log_replicas", self.log_replication_factor, 1)?;
        at_least("storage_quorum", self.durable_storage_quorum, 1)?;
        at_least("storage_replicas", self.storage_team_size, 1)?;
        at_least("desired proxies", self.desired_proxies(), 1)?;
        at_least("desired logs", self.desired_logs(), 1)?;
        at_least("desired resolvers", self.desired_resolvers(), 1)?;
        require(
            self.durable_storage_quorum <= self.storage_team_size,
            Violation::QuorumExceedsTeam {
                quorum: self.durable_storage_quorum,
                team_size: self.storage_team_size,
            },
        )?;
        require(self.log_store_type.is_set(), Violation::EngineUnset("log"))?;
        require(
            self.storage_store_type.is_set(),
            Violation::EngineUnset("storage"),
        )?;
        at_least("auto_proxies", self.auto_proxy_count, 1)?;
        at_least("auto_resolvers", self.auto_resolver_count, 1)?;
        at_least("auto_logs", self.auto_desired_log_count, 1)?;
        require(
            self.storage_policy.is_some(),
            Violation::PolicyMissing("storage"),
        )?;
        require(self.log_policy.is_some(), Violation::PolicyMissing("log"))?;
        at_least("desired remote logs", self.desired_remote_logs(), 1)?;
        at_least("desired log routers", self.desired_log_routers(), 1)?;

        self.check_remote()?;
        self.check_satellites()
    }

    fn check_remote(&self) -> Result<(), Violation> {
        at_least(
            "remote_log_replicas",
            self.remote_log_replication_factor,
            0,
        )?;
        if self.remote_log_replication_factor > 0 {
            require(
                self.remote_log_policy.is_some(),
                Violation::RemoteIncomplete("a remote log policy"),
            )?;
            require(
                self.primary_dc_id.is_some(),
                Violation::RemoteIncomplete("a primary datacenter"),
            )?;
            require(
                self.remote_dc_id.is_some(),
                Violation::RemoteIncomplete("a remote datacenter"),
            )?;
            require(
                self.durable_storage_quorum == self.storage_team_size,
                Violation::RemoteIncomplete("storage quorum equal to team size"),
            )?;
        }
        require(
            self.primary_dc_id.is_some() == self.remote_dc_id.is_some(),
            Violation::DatacenterMismatch,
        )
    }

    fn check_satellites(&self) -> Result<(), Violation> {
        at_least("desired satellite logs", self.desired_satellite_logs(), 1)?;
        at_least(
            "satellite_log_replicas",
            self.satellite_log_replication_factor,
            0,
        )?;
        at_least(
            "satellite_anti_quorum",
            self.satellite_log_write_anti_quorum,
            0,
        )?;
        at_least("satellite_usable_dcs", self.satellite_log_usable_dcs, 0)?;
        if self.satellite_log_replication_factor > 0 {
            require(
                self.satellite_log_policy.is_some(),
                Violation::SatelliteIncomplete("a satellite log policy"),
            )?;
            require(
                !self.primary_satellite_dc_ids.is_empty(),
                Violation::SatelliteIncomplete("primary satellite datacenters"),
            )?;
            require(
                !self.remote_satellite_dc_ids.is_empty(),
                Violation::SatelliteIncomplete("remote satellite datacenters"),
            )?;
            require(
                self.remote_log_replication_factor > 0,
                Violation::SatelliteIncomplete("remote logs"),
            )?;
        }
        require(
            self.primary_satellite_dc_ids.len() == self.remote_satellite_dc_ids.len(),
            Violation::SatelliteListMismatch {
                primary: self.primary_satellite_dc_ids.len(),
                remote: self.remote_satellite_dc_ids.len(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ReplicationPolicy;
    use crate::types::StoreType;
    use bytes::Bytes;

    fn valid() -> ConfigFields {
        let mut f = ConfigFields::default();
        f.initialized = true;
        f.log_write_anti_quorum = 0;
        f.log_replication_factor = 3;
        f.durable_storage_quorum = 3;
        f.storage_team_size = 3;
        f.log_store_type = StoreType::SsdBtreeV2;
        f.storage_store_type = StoreType::SsdBtreeV2;
        f.log_policy = Some(ReplicationPolicy::across_zones(3));
        f.storage_policy = Some(ReplicationPolicy::across_zones(3));
        f
    }

    fn multi_region() -> ConfigFields {
        let mut f = valid();
        f.primary_dc_id = Some(Bytes::from_static(b"dc1"));
        f.remote_dc_id = Some(Bytes::from_static(b"dc2"));
        f.remote_log_replication_factor = 2;
        f.remote_log_policy = Some(ReplicationPolicy::across_zones(2));
        f.satellite_log_replication_factor = 2;
        f.satellite_log_usable_dcs = 1;
        f.satellite_log_policy = Some(ReplicationPolicy::across_zones(2));
        f.primary_satellite_dc_ids = vec![Bytes::from_static(b"dc3")];
        f.remote_satellite_dc_ids = vec![Bytes::from_static(b"dc4")];
        f
    }

    fn assert_breaks(f: &ConfigFields) {
        assert!(!f.is_valid(), "expected invalid: {f:?}");
        assert!(f.violation().is_some());
    }

    #[test]
    fn baseline_is_valid() {
        assert!(valid().is_valid());
        assert_eq!(valid().violation(), None);
        assert!(multi_region().is_valid());
    }

    #[test]
    fn reset_state_is_invalid() {
        assert_eq!(
            ConfigFields::default().violation(),
            Some(Violation::NotInitialized)
        );
    }

    #[test]
    fn each_primary_rule() {
        let breakers: Vec<fn(&mut ConfigFields)> = vec![
            |f: &mut ConfigFields| f.initialized = false,
            |f: &mut ConfigFields| f.log_write_anti_quorum = -1,
            |f: &mut ConfigFields| f.log_replication_factor = 0,
            |f: &mut ConfigFields| f.durable_storage_quorum = 0,
            |f: &mut ConfigFields| f.storage_team_size = 0,
            |f: &mut ConfigFields| f.proxy_count = 0,
            |f: &mut ConfigFields| f.desired_log_count = 0,
            |f: &mut ConfigFields| f.resolver_count = 0,
            |f: &mut ConfigFields| f.durable_storage_quorum = 4,
            |f: &mut ConfigFields| f.log_store_type = StoreType::Unset,
            |f: &mut ConfigFields| f.storage_store_type = StoreType::Unset,
            |f: &mut ConfigFields| f.auto_proxy_count = 0,
            |f: &mut ConfigFields| f.auto_resolver_count = 0,
            |f: &mut ConfigFields| f.auto_desired_log_count = 0,
            |f: &mut ConfigFields| f.storage_policy = None,
            |f: &mut ConfigFields| f.log_policy = None,
            |f: &mut ConfigFields| f.remote_desired_log_count = 0,
            |f: &mut ConfigFields| f.desired_log_router_count = 0,
            |f: &mut ConfigFields| f.satellite_desired_log_count = 0,
        ];
        for breaker in breakers {
            let mut f = valid();
            breaker(&mut f);
            assert_breaks(&f);
        }
    }

    #[test]
    fn each_region_rule() {
        let breakers: Vec<fn(&mut ConfigFields)> = vec![
            |f: &mut ConfigFields| f.remote_log_replication_factor = -1,
            |f: &mut ConfigFields| f.remote_log_policy = None,
            |f: &mut ConfigFields| f.primary_dc_id = None,
            |f: &mut ConfigFields| f.remote_dc_id = None,
            |f: &mut ConfigFields| {
                f.storage_team_size = 4;
            },
            |f: &mut ConfigFields| f.satellite_log_replication_factor = -1,
            |f: &mut ConfigFields| f.satellite_log_write_anti_quorum = -1,
            |f: &mut ConfigFields| f.satellite_log_usable_dcs = -1,
            |f: &mut ConfigFields| f.satellite_log_policy = None,
            |f: &mut ConfigFields| {
                f.primary_satellite_dc_ids.clear();
            },
            |f: &mut ConfigFields| {
                f.remote_satellite_dc_ids.clear();
            },
            |f: &mut ConfigFields| {
                f.remote_satellite_dc_ids.push(Bytes::from_static(b"dc5"));
            },
        ];
        for breaker in breakers {
            let mut f = multi_region();
            breaker(&mut f);
            assert_breaks(&f);
        }
    }

    #[test]
    fn satellites_need_remote_region() {
        let mut f = multi_region();
        f.remote_log_replication_factor = 0;
        assert_eq!(
            f.violation(),
            Some(Violation::SatelliteIncomplete("remote logs"))
        );
    }

    #[test]
    fn lone_datacenter_is_mismatch() {
        let mut f = valid();
        f.primary_dc_id = Some(Bytes::from_static(b"dc1"));
        assert_eq!(f.violation(), Some(Violation::DatacenterMismatch));
    }

    #[test]
    fn disabled_regions_need_nothing() {
        let f = valid();
        assert_eq!(f.remote_log_replication_factor, 0);
        assert_eq!(f.satellite_log_replication_factor, 0);
        assert!(f.remote_log_policy.is_none());
        assert!(f.is_valid());
    }

    #[test]
    fn violation_messages() {
        let mut f = valid();
        f.durable_storage_quorum = 5;
        assert_eq!(
            f.violation().unwrap().to_string(),
            "storage quorum 5 exceeds team size 3"
        );
    }
}
