//! Validate command implementation.

use clusterconf_core::DatabaseConfiguration;
use tracing::info;

/// Runs the validate command.
///
/// Fails with the first broken rule when the configuration is invalid.
pub fn run(config: &DatabaseConfiguration) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(violation) = config.violation() {
        return Err(format!("Configuration is invalid: {violation}").into());
    }
    info!(summary = %config, "configuration is valid");
    println!("OK: {config}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dump;

    #[test]
    fn invalid_dump_fails() {
        let config = dump::parse("initialized=\nstorage_quorum=4\nstorage_replicas=3\n").unwrap();
        let err = run(&config).unwrap_err();
        assert!(err.to_string().starts_with("Configuration is invalid"));
    }

    #[test]
    fn valid_dump_passes() {
        let config = dump::parse(
            "initialized=\nlog_replicas=1\nlog_anti_quorum=0\nstorage_replicas=1\nstorage_quorum=1\n\
             log_engine=1\nstorage_engine=1\n",
        )
        .unwrap();
        run(&config).unwrap();
    }
}
