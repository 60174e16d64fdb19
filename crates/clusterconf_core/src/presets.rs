//! Named configuration presets.
//!
//! Each preset expands to the key settings that produce it. Applying those
//! settings to an initialized configuration makes the canonical summary
//! report the preset's own name.

use crate::error::{CoreError, CoreResult};
use crate::keys::{config_key, ConfigKey, ConfigValue};
use crate::mutation::Mutation;
use crate::policy::{ReplicationPolicy, DATA_HALL, DC_ID};
use crate::types::StoreType;
use bytes::Bytes;
use clusterconf_codec::Encode;
use std::fmt;
use std::str::FromStr;

/// Value of a single preset setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// Decimal integer.
    Int(i32),
    /// Serialized replication policy.
    Policy(ReplicationPolicy),
}

/// One `name = value` pair in the configuration subspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSetting {
    /// Field name without the subspace prefix.
    pub name: &'static str,
    /// Value to store.
    pub value: SettingValue,
}

impl ConfigSetting {
    const fn int(name: &'static str, value: i32) -> Self {
        Self {
            name,
            value: SettingValue::Int(value),
        }
    }

    fn policy(name: &'static str, policy: ReplicationPolicy) -> Self {
        Self {
            name,
            value: SettingValue::Policy(policy),
        }
    }

    /// Full key of the setting.
    #[must_use]
    pub fn key(&self) -> ConfigKey {
        config_key(self.name)
    }

    /// Stored bytes of the setting.
    ///
    /// # Errors
    ///
    /// Returns an error if a policy cannot be encoded.
    pub fn value_bytes(&self) -> CoreResult<ConfigValue> {
        match &self.value {
            SettingValue::Int(n) => Ok(Bytes::from(n.to_string())),
            SettingValue::Policy(policy) => Ok(Bytes::from(policy.encode()?)),
        }
    }

    /// The `Set` mutation that stores this setting.
    ///
    /// # Errors
    ///
    /// Returns an error if a policy cannot be encoded.
    pub fn to_mutation(&self) -> CoreResult<Mutation> {
        Ok(Mutation::set(self.key(), self.value_bytes()?))
    }
}

impl fmt::Display for ConfigSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            SettingValue::Int(n) => write!(f, "{}={n}", self.name),
            SettingValue::Policy(policy) => write!(f, "{}={policy}", self.name),
        }
    }
}

/// Primary redundancy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedundancyMode {
    /// One copy of everything.
    Single,
    /// Two copies across zones.
    Double,
    /// Three copies across zones.
    Triple,
    /// Three copies spread over three datacenters.
    ThreeDatacenter,
    /// Storage across three data halls, logs across two halls and zones.
    ThreeDataHall,
    /// Two-datacenter layout with six storage replicas.
    MultiDc,
}

impl RedundancyMode {
    /// All presets, in order of increasing redundancy.
    pub const ALL: [Self; 6] = [
        Self::Single,
        Self::Double,
        Self::Triple,
        Self::ThreeDatacenter,
        Self::ThreeDataHall,
        Self::MultiDc,
    ];

    /// Canonical name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::ThreeDatacenter => "three_datacenter",
            Self::ThreeDataHall => "three_data_hall",
            Self::MultiDc => "multi_dc",
        }
    }

    /// Settings that produce this mode.
    #[must_use]
    pub fn settings(self) -> Vec<ConfigSetting> {
        let (log_replicas, storage_replicas, log_policy, storage_policy) = match self {
            Self::Single => (1, 1, ReplicationPolicy::One, ReplicationPolicy::One),
            Self::Double => (
                2,
                2,
                ReplicationPolicy::across_zones(2),
                ReplicationPolicy::across_zones(2),
            ),
            Self::Triple => (
                3,
                3,
                ReplicationPolicy::across_zones(3),
                ReplicationPolicy::across_zones(3),
            ),
            Self::ThreeDatacenter => {
                let policy = ReplicationPolicy::And(vec![
                    ReplicationPolicy::across(3, DC_ID, ReplicationPolicy::One),
                    ReplicationPolicy::across_zones(3),
                ]);
                (3, 3, policy.clone(), policy)
            }
            Self::ThreeDataHall => (
                4,
                3,
                ReplicationPolicy::across(2, DATA_HALL, ReplicationPolicy::across_zones(2)),
                ReplicationPolicy::across(3, DATA_HALL, ReplicationPolicy::One),
            ),
            Self::MultiDc => (
                4,
                6,
                ReplicationPolicy::across(2, DC_ID, ReplicationPolicy::across_zones(2)),
                ReplicationPolicy::across(3, DC_ID, ReplicationPolicy::across_zones(2)),
            ),
        };
        vec![
            ConfigSetting::int("log_replicas", log_replicas),
            ConfigSetting::int("log_anti_quorum", 0),
            ConfigSetting::int("storage_replicas", storage_replicas),
            ConfigSetting::int("storage_quorum", storage_replicas),
            ConfigSetting::policy("log_replication_policy", log_policy),
            ConfigSetting::policy("storage_replication_policy", storage_policy),
        ]
    }
}

/// Storage engine presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageEngine {
    /// B-tree v1 for logs and storage.
    Ssd1,
    /// B-tree v2 for logs and storage.
    Ssd2,
    /// Memory engine for logs and storage.
    Memory,
}

impl StorageEngine {
    /// All presets.
    pub const ALL: [Self; 3] = [Self::Ssd1, Self::Ssd2, Self::Memory];

    /// Canonical name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ssd1 => "ssd-1",
            Self::Ssd2 => "ssd-2",
            Self::Memory => "memory",
        }
    }

    /// Engine used by both logs and storage servers.
    #[must_use]
    pub const fn store_type(self) -> StoreType {
        match self {
            Self::Ssd1 => StoreType::SsdBtreeV1,
            Self::Ssd2 => StoreType::SsdBtreeV2,
            Self::Memory => StoreType::Memory,
        }
    }

    /// Settings that produce this engine pair.
    #[must_use]
    pub fn settings(self) -> Vec<ConfigSetting> {
        let code = self.store_type().code().unwrap_or_default();
        vec![
            ConfigSetting::int("log_engine", code),
            ConfigSetting::int("storage_engine", code),
        ]
    }
}

/// Satellite log presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SatelliteRedundancyMode {
    /// No satellite logs.
    None,
    /// One satellite, one replica.
    OneSatelliteSingle,
    /// One satellite, two replicas.
    OneSatelliteDouble,
    /// One satellite, three replicas.
    OneSatelliteTriple,
    /// Two satellites, every replica acknowledges.
    TwoSatelliteSafe,
    /// Two satellites, two replicas may lag.
    TwoSatelliteFast,
}

impl SatelliteRedundancyMode {
    /// All presets.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::OneSatelliteSingle,
        Self::OneSatelliteDouble,
        Self::OneSatelliteTriple,
        Self::TwoSatelliteSafe,
        Self::TwoSatelliteFast,
    ];

    /// Canonical name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OneSatelliteSingle => "one_satellite_single",
            Self::OneSatelliteDouble => "one_satellite_double",
            Self::OneSatelliteTriple => "one_satellite_triple",
            Self::TwoSatelliteSafe => "two_satellite_safe",
            Self::TwoSatelliteFast => "two_satellite_fast",
        }
    }

    /// Settings that produce this mode.
    ///
    /// [`SatelliteRedundancyMode::None`] only zeroes the replica count; any
    /// stored satellite policy is left in place.
    #[must_use]
    pub fn settings(self) -> Vec<ConfigSetting> {
        let (replicas, usable, anti_quorum, policy) = match self {
            Self::None => return vec![ConfigSetting::int("satellite_log_replicas", 0)],
            Self::OneSatelliteSingle => (1, 1, 0, ReplicationPolicy::One),
            Self::OneSatelliteDouble => (2, 1, 0, ReplicationPolicy::across_zones(2)),
            Self::OneSatelliteTriple => (3, 1, 0, ReplicationPolicy::across_zones(3)),
            Self::TwoSatelliteSafe => (4, 2, 0, two_dc_two_zone()),
            Self::TwoSatelliteFast => (4, 2, 2, two_dc_two_zone()),
        };
        vec![
            ConfigSetting::int("satellite_log_replicas", replicas),
            ConfigSetting::int("satellite_usable_dcs", usable),
            ConfigSetting::int("satellite_anti_quorum", anti_quorum),
            ConfigSetting::policy("satellite_log_policy", policy),
        ]
    }
}

fn two_dc_two_zone() -> ReplicationPolicy {
    ReplicationPolicy::across(2, DC_ID, ReplicationPolicy::across_zones(2))
}

/// Remote region presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteRedundancyMode {
    /// No remote region.
    None,
    /// One remote log replica.
    RemoteSingle,
    /// Two remote log replicas across zones.
    RemoteDouble,
    /// Three remote log replicas across zones.
    RemoteTriple,
}

impl RemoteRedundancyMode {
    /// All presets.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::RemoteSingle,
        Self::RemoteDouble,
        Self::RemoteTriple,
    ];

    /// Canonical name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RemoteSingle => "remote_single",
            Self::RemoteDouble => "remote_double",
            Self::RemoteTriple => "remote_triple",
        }
    }

    /// Settings that produce this mode.
    #[must_use]
    pub fn settings(self) -> Vec<ConfigSetting> {
        let (replicas, policy) = match self {
            Self::None => return vec![ConfigSetting::int("remote_log_replicas", 0)],
            Self::RemoteSingle => (1, ReplicationPolicy::One),
            Self::RemoteDouble => (2, ReplicationPolicy::across_zones(2)),
            Self::RemoteTriple => (3, ReplicationPolicy::across_zones(3)),
        };
        vec![
            ConfigSetting::int("remote_log_replicas", replicas),
            ConfigSetting::policy("remote_log_policy", policy),
        ]
    }
}

/// Any named preset, looked up by its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Primary redundancy preset.
    Redundancy(RedundancyMode),
    /// Storage engine preset.
    Engine(StorageEngine),
    /// Satellite preset.
    Satellite(SatelliteRedundancyMode),
    /// Remote region preset.
    Remote(RemoteRedundancyMode),
}

impl Preset {
    /// Settings that produce this preset.
    #[must_use]
    pub fn settings(self) -> Vec<ConfigSetting> {
        match self {
            Self::Redundancy(mode) => mode.settings(),
            Self::Engine(engine) => engine.settings(),
            Self::Satellite(mode) => mode.settings(),
            Self::Remote(mode) => mode.settings(),
        }
    }

    /// Canonical name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Redundancy(mode) => mode.name(),
            Self::Engine(engine) => engine.name(),
            Self::Satellite(mode) => mode.name(),
            Self::Remote(mode) => mode.name(),
        }
    }
}

impl FromStr for Preset {
    type Err = CoreError;

    /// Parses a preset name. The satellite and remote `none` presets are
    /// spelled `satellite_none` and `remote_none` here to stay unambiguous.
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "satellite_none" => return Ok(Self::Satellite(SatelliteRedundancyMode::None)),
            "remote_none" => return Ok(Self::Remote(RemoteRedundancyMode::None)),
            _ => {}
        }
        RedundancyMode::ALL
            .into_iter()
            .map(Self::Redundancy)
            .chain(StorageEngine::ALL.into_iter().map(Self::Engine))
            .chain(
                SatelliteRedundancyMode::ALL
                    .into_iter()
                    .filter(|m| *m != SatelliteRedundancyMode::None)
                    .map(Self::Satellite),
            )
            .chain(
                RemoteRedundancyMode::ALL
                    .into_iter()
                    .filter(|m| *m != RemoteRedundancyMode::None)
                    .map(Self::Remote),
            )
            .find(|preset| preset.name() == s)
            .ok_or_else(|| CoreError::unknown_preset(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_lookup() {
        assert_eq!(
            "triple".parse::<Preset>().unwrap(),
            Preset::Redundancy(RedundancyMode::Triple)
        );
        assert_eq!(
            "memory".parse::<Preset>().unwrap(),
            Preset::Engine(StorageEngine::Memory)
        );
        assert_eq!(
            "two_satellite_fast".parse::<Preset>().unwrap(),
            Preset::Satellite(SatelliteRedundancyMode::TwoSatelliteFast)
        );
        assert_eq!(
            "remote_none".parse::<Preset>().unwrap(),
            Preset::Remote(RemoteRedundancyMode::None)
        );
        assert!(matches!(
            "quadruple".parse::<Preset>(),
            Err(CoreError::UnknownPreset { .. })
        ));
        assert!("none".parse::<Preset>().is_err());
    }

    #[test]
    fn setting_display() {
        let settings = RedundancyMode::Double.settings();
        let lines: Vec<String> = settings.iter().map(ToString::to_string).collect();
        assert!(lines.contains(&"log_replicas=2".to_string()));
        assert!(lines.contains(&"storage_replication_policy=zoneid^2 x 1".to_string()));
    }

    #[test]
    fn setting_bytes() {
        let setting = ConfigSetting::int("logs", 7);
        assert_eq!(&setting.key()[..], b"\xff/conf/logs");
        assert_eq!(&setting.value_bytes().unwrap()[..], b"7");
    }

    #[test]
    fn engine_codes() {
        let settings = StorageEngine::Ssd2.settings();
        assert!(settings
            .iter()
            .all(|s| s.value == SettingValue::Int(2)));
    }
}
