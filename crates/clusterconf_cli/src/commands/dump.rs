//! Text dump loading and rendering.

use bytes::Bytes;
use clusterconf_codec::{Decode, Encode};
use clusterconf_core::{
    is_policy_key, printable, CoreError, DatabaseConfiguration, ReplicationPolicy,
    CONFIG_KEYS_PREFIX,
};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a dump.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A line is not `name=value`.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Description.
        message: String,
    },

    /// A policy value could not be parsed or encoded.
    #[error("line {line}: {source}")]
    Policy {
        /// 1-based line number.
        line: usize,
        /// Underlying error.
        source: CoreError,
    },
}

impl DumpError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Reads a dump file into a configuration.
pub fn load(path: &Path) -> Result<DatabaseConfiguration, DumpError> {
    let text = std::fs::read_to_string(path).map_err(|source| DumpError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse(&text)?;
    debug!(path = %path.display(), entries = config.len(), "dump loaded");
    Ok(config)
}

/// Parses dump text into a configuration.
pub fn parse(text: &str) -> Result<DatabaseConfiguration, DumpError> {
    let mut pairs = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (name, value) = trimmed
            .split_once('=')
            .ok_or_else(|| DumpError::syntax(line, "expected name=value"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DumpError::syntax(line, "empty key name"));
        }
        let value = value.trim();

        let suffix = unescape(name).map_err(|message| DumpError::syntax(line, message))?;
        let key = Bytes::from([CONFIG_KEYS_PREFIX, &suffix[..]].concat());
        let is_policy = std::str::from_utf8(&suffix).is_ok_and(is_policy_key);
        // descriptors never contain a backslash; escaped or empty policy values are raw blobs
        let value = if is_policy && !value.is_empty() && !value.contains('\\') {
            let policy: ReplicationPolicy = value
                .parse()
                .map_err(|source| DumpError::Policy { line, source })?;
            let encoded = policy.encode().map_err(|e| DumpError::Policy {
                line,
                source: CoreError::from(e),
            })?;
            Bytes::from(encoded)
        } else {
            Bytes::from(unescape(value).map_err(|message| DumpError::syntax(line, message))?)
        };
        pairs.push((key, value));
    }
    Ok(DatabaseConfiguration::from_key_values(pairs))
}

/// Renders every stored key as a dump line.
///
/// Policy values are shown as descriptors. Other bytes go through
/// [`printable`], with `=` and `#` escaped in names and edge spaces escaped
/// in values, so the output parses back to the same configuration. A policy
/// blob that does not read back identically from its descriptor is written
/// fully escaped. A key with an empty suffix has no dump form.
pub fn render(config: &DatabaseConfiguration) -> Vec<String> {
    config
        .iter()
        .map(|(key, value)| {
            let suffix = key.strip_prefix(CONFIG_KEYS_PREFIX).unwrap_or(key);
            let name = escape_name(suffix);
            let policy_key = std::str::from_utf8(suffix).is_ok_and(is_policy_key);
            let shown = if policy_key {
                descriptor(value).unwrap_or_else(|| hex_escaped(value))
            } else {
                escape_value(value)
            };
            format!("{name}={shown}")
        })
        .collect()
}

fn descriptor(blob: &[u8]) -> Option<String> {
    let policy = ReplicationPolicy::decode(blob).ok()?;
    let text = policy.describe();
    let reparsed: ReplicationPolicy = text.parse().ok()?;
    (reparsed.encode().ok()? == blob).then_some(text)
}

fn hex(b: u8) -> String {
    format!("\\x{b:02x}")
}

fn escape_name(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for (i, &b) in bytes.iter().enumerate() {
        let edge = i == 0 || i + 1 == bytes.len();
        match b {
            b'=' | b'#' => out.push_str(&hex(b)),
            b' ' if edge => out.push_str(&hex(b)),
            _ => out.push_str(&printable(&[b])),
        }
    }
    out
}

fn escape_value(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for (i, &b) in bytes.iter().enumerate() {
        let edge = i == 0 || i + 1 == bytes.len();
        if b == b' ' && edge {
            out.push_str(&hex(b));
        } else {
            out.push_str(&printable(&[b]));
        }
    }
    out
}

fn hex_escaped(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| hex(b)).collect()
}

fn unescape(text: &str) -> Result<Vec<u8>, String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'\\') => {
                out.push(b'\\');
                i += 2;
            }
            Some(b'x') => {
                let hex = bytes
                    .get(i + 2..i + 4)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| format!("bad \\x escape in {text:?}"))?;
                out.push(hex);
                i += 4;
            }
            _ => return Err(format!("bad escape in {text:?}")),
        }
    }
    Ok(out)
}
