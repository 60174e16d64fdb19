//! Exclusions command implementation.

use clusterconf_core::{AddressExclusion, DatabaseConfiguration};
use std::net::SocketAddr;

/// Returns the stored exclusion that covers `addr`, preferring a process
/// exclusion over a whole-machine one.
pub fn covering(config: &DatabaseConfiguration, addr: SocketAddr) -> Option<AddressExclusion> {
    let excluded = config.get_excluded_servers();
    let process = AddressExclusion::process(addr.ip(), addr.port());
    if excluded.contains(&process) {
        return Some(process);
    }
    excluded.into_iter().find(|exclusion| exclusion.excludes(addr))
}

/// Runs the exclusions command.
///
/// Lists every excluded server, or with `check` reports whether one address
/// is excluded.
pub fn run(
    config: &DatabaseConfiguration,
    check: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = check {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| format!("Invalid address {addr:?}: {e}"))?;
        match covering(config, addr) {
            Some(exclusion) => println!("{addr}: excluded by {exclusion}"),
            None => println!("{addr}: not excluded"),
        }
        return Ok(());
    }

    let excluded = config.get_excluded_servers();
    if excluded.is_empty() {
        println!("No servers excluded");
        return Ok(());
    }
    println!("Excluded servers ({}):", excluded.len());
    for exclusion in &excluded {
        let scope = if exclusion.is_whole_machine() {
            "machine"
        } else {
            "process"
        };
        println!("  {exclusion:<40} {scope}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dump;

    #[test]
    fn bad_address_is_rejected() {
        let config = dump::parse("excluded/10.0.0.1=\n").unwrap();
        assert!(run(&config, Some("10.0.0.1")).is_err());
        assert!(run(&config, Some("10.0.0.1:4500")).is_ok());
        assert!(run(&config, None).is_ok());
    }

    #[test]
    fn check_reports_the_covering_exclusion() {
        let config = dump::parse("excluded/10.0.0.1=\nexcluded/10.0.0.2:4500=\n").unwrap();

        let machine = covering(&config, "10.0.0.1:4501".parse().unwrap()).unwrap();
        assert!(machine.is_whole_machine());

        let process = covering(&config, "10.0.0.2:4500".parse().unwrap()).unwrap();
        assert_eq!(process.to_string(), "10.0.0.2:4500");

        assert!(covering(&config, "10.0.0.2:4501".parse().unwrap()).is_none());
        assert!(covering(&config, "10.0.0.3:4500".parse().unwrap()).is_none());

        for addr in ["10.0.0.1:1", "10.0.0.2:4500", "10.0.0.2:1"] {
            let addr: SocketAddr = addr.parse().unwrap();
            assert_eq!(covering(&config, addr).is_some(), config.is_excluded_server(addr));
        }
    }
}
