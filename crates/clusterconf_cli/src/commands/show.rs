//! Show command implementation.

use super::dump;
use clusterconf_core::DatabaseConfiguration;
use serde::Serialize;
use std::collections::BTreeMap;

/// Configuration report.
#[derive(Debug, Serialize)]
pub struct ShowResult {
    /// Whether every validity rule holds.
    pub valid: bool,
    /// First broken rule, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
    /// Number of stored keys.
    pub entry_count: usize,
    /// Canonical named-mode summary.
    pub summary: BTreeMap<String, String>,
    /// Effective process counts.
    pub desired: DesiredCounts,
    /// Excluded servers.
    pub excluded: Vec<String>,
    /// Stored keys as dump lines (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

/// Effective process counts after automatic defaults.
#[derive(Debug, Serialize)]
pub struct DesiredCounts {
    /// Proxies.
    pub proxies: i32,
    /// Resolvers.
    pub resolvers: i32,
    /// Primary logs.
    pub logs: i32,
    /// Remote logs.
    pub remote_logs: i32,
    /// Satellite logs.
    pub satellite_logs: i32,
    /// Log routers.
    pub log_routers: i32,
}

/// Builds the report for a configuration.
pub fn report(config: &DatabaseConfiguration, with_keys: bool) -> ShowResult {
    let fields = config.fields();
    ShowResult {
        valid: config.is_valid(),
        violation: config.violation().map(|v| v.to_string()),
        entry_count: config.len(),
        summary: config.to_canonical_map(),
        desired: DesiredCounts {
            proxies: fields.desired_proxies(),
            resolvers: fields.desired_resolvers(),
            logs: fields.desired_logs(),
            remote_logs: fields.desired_remote_logs(),
            satellite_logs: fields.desired_satellite_logs(),
            log_routers: fields.desired_log_routers(),
        },
        excluded: config
            .get_excluded_servers()
            .iter()
            .map(ToString::to_string)
            .collect(),
        keys: with_keys.then(|| dump::render(config)),
    }
}

/// Runs the show command.
pub fn run(
    config: &DatabaseConfiguration,
    format: &str,
    with_keys: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = report(config, with_keys);
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "text" => {
            print!("{}", render_text(&result));
        }
        other => return Err(format!("Unknown format: {other}").into()),
    }
    Ok(())
}

fn render_text(result: &ShowResult) -> String {
    let mut out = String::new();
    out.push_str("Cluster Configuration\n");
    out.push_str("=====================\n");
    match &result.violation {
        None => out.push_str("Status:       valid\n"),
        Some(reason) => out.push_str(&format!("Status:       INVALID ({reason})\n")),
    }
    out.push_str(&format!("Keys:         {}\n", result.entry_count));

    if !result.summary.is_empty() {
        out.push_str("\nSummary:\n");
        for (key, value) in &result.summary {
            out.push_str(&format!("  {key:<26} {value}\n"));
        }
    }

    let d = &result.desired;
    out.push_str("\nDesired processes:\n");
    for (name, count) in [
        ("proxies", d.proxies),
        ("resolvers", d.resolvers),
        ("logs", d.logs),
        ("remote_logs", d.remote_logs),
        ("satellite_logs", d.satellite_logs),
        ("log_routers", d.log_routers),
    ] {
        out.push_str(&format!("  {name:<26} {count}\n"));
    }

    if !result.excluded.is_empty() {
        out.push_str(&format!("\nExcluded servers ({}):\n", result.excluded.len()));
        for server in &result.excluded {
            out.push_str(&format!("  {server}\n"));
        }
    }

    if let Some(keys) = &result.keys {
        out.push_str("\nKeys:\n");
        for line in keys {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_for_empty_dump() {
        let config = dump::parse("# nothing here\n").unwrap();
        let result = report(&config, false);
        assert!(!result.valid);
        assert_eq!(
            result.violation.as_deref(),
            Some("configuration is not initialized")
        );
        assert!(result.summary.is_empty());
        assert_eq!(result.desired.proxies, 3);
        assert_eq!(result.desired.resolvers, 1);
        assert_eq!(result.desired.logs, 3);
        assert!(result.keys.is_none());
    }

    #[test]
    fn report_text_and_json() {
        let config = dump::parse(
            "initialized=\nlog_replicas=2\nlog_anti_quorum=0\nstorage_replicas=2\nstorage_quorum=2\n\
             log_engine=0\nstorage_engine=0\nlogs=5\nexcluded/10.1.1.1:4500=\n",
        )
        .unwrap();
        let result = report(&config, true);
        assert!(result.valid, "{:?}", result.violation);
        assert_eq!(result.summary["redundancy_mode"], "double");
        assert_eq!(result.summary["storage_engine"], "ssd-1");
        assert_eq!(result.summary["logs"], "5");
        assert_eq!(result.excluded, vec!["10.1.1.1:4500".to_string()]);

        let text = render_text(&result);
        assert!(text.contains("Status:       valid"));
        assert!(text.contains("10.1.1.1:4500"));
        assert!(text.contains("logs=5"));

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["summary"]["redundancy_mode"], "double");
        assert_eq!(json["desired"]["logs"], 5);
        assert!(json.get("violation").is_none());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let config = dump::parse("").unwrap();
        assert!(run(&config, "yaml", false).is_err());
    }
}
