//! Configuration fixtures.
//!
//! Builders for the cluster layouts most tests start from.

use bytes::Bytes;
use clusterconf_core::{
    config_key, AddressExclusion, ConfigKey, ConfigSetting, ConfigValue, DatabaseConfiguration,
    Mutation, Preset, RedundancyMode, RemoteRedundancyMode, SatelliteRedundancyMode,
    StorageEngine,
};

/// Returns a configuration holding only the `initialized` key.
pub fn initialized() -> DatabaseConfiguration {
    let mut config = DatabaseConfiguration::new();
    config.apply_mutation(&Mutation::set(config_key("initialized"), Bytes::new()));
    config
}

/// Applies every setting of `presets`, in order.
pub fn apply_presets(config: &mut DatabaseConfiguration, presets: &[Preset]) {
    for preset in presets {
        apply_settings(config, &preset.settings());
    }
}

/// Applies `settings` as set mutations.
pub fn apply_settings(config: &mut DatabaseConfiguration, settings: &[ConfigSetting]) {
    for setting in settings {
        let mutation = setting
            .to_mutation()
            .expect("Failed to encode preset setting");
        config.apply_mutation(&mutation);
    }
}

/// Initialized configuration with the given presets applied.
pub fn with_presets(presets: &[Preset]) -> DatabaseConfiguration {
    let mut config = initialized();
    apply_presets(&mut config, presets);
    config
}

/// Valid single-region configuration: three zones, `ssd-2` engine.
pub fn triple_ssd() -> DatabaseConfiguration {
    with_presets(&[
        Preset::Redundancy(RedundancyMode::Triple),
        Preset::Engine(StorageEngine::Ssd2),
    ])
}

/// Valid two-region configuration with one satellite per region.
pub fn multi_region() -> DatabaseConfiguration {
    let mut config = with_presets(&[
        Preset::Redundancy(RedundancyMode::MultiDc),
        Preset::Engine(StorageEngine::Ssd2),
        Preset::Remote(RemoteRedundancyMode::RemoteDouble),
        Preset::Satellite(SatelliteRedundancyMode::OneSatelliteDouble),
    ]);
    for (name, value) in [
        ("primary_dc", "dc1"),
        ("remote_dc", "dc2"),
        ("primary_satellite_dcs", "dc3"),
        ("remote_satellite_dcs", "dc4"),
    ] {
        config.apply_mutation(&Mutation::set(config_key(name), Bytes::from(value)));
    }
    config
}

/// Adds an exclusion key for `exclusion`.
pub fn exclude(config: &mut DatabaseConfiguration, exclusion: AddressExclusion) {
    config.apply_mutation(&Mutation::set(exclusion.to_key(), Bytes::new()));
}

/// Stored pairs of `config`, in key order.
pub fn pairs_of(config: &DatabaseConfiguration) -> Vec<(ConfigKey, ConfigValue)> {
    config
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
