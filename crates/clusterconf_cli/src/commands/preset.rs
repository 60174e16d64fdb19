//! Preset command implementation.

use clusterconf_core::Preset;

/// Dump lines that produce the named preset.
pub fn lines(name: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let preset: Preset = name.parse()?;
    Ok(preset
        .settings()
        .iter()
        .map(ToString::to_string)
        .collect())
}

/// Runs the preset command.
pub fn run(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    for line in lines(name)? {
        println!("{line}");
    }
    Ok(())
}
