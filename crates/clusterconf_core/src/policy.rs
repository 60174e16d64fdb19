//! Replication policies.
//!
//! A policy describes how replicas must be spread across failure domains.
//! The configuration model never evaluates a policy; it only stores the
//! serialized blob, decodes it, and compares the descriptor returned by
//! [`ReplicationPolicy::describe`] when naming redundancy modes.
//!
//! Descriptor grammar:
//!
//! ```text
//! policy := "1"
//!         | attribute "^" count " x " policy
//!         | "(" "(" policy ")" { " & (" policy ")" } ")"
//! ```

use crate::error::{CoreError, CoreResult};
use clusterconf_codec::{from_versioned_bytes, to_versioned_bytes, CodecResult, Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Locality attribute naming a machine's zone.
pub const ZONE_ID: &str = "zoneid";

/// Locality attribute naming a datacenter.
pub const DC_ID: &str = "dcid";

/// Locality attribute naming a data hall.
pub const DATA_HALL: &str = "data_hall";

/// A replica placement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationPolicy {
    /// Any single server.
    One,
    /// `count` distinct values of `attribute`, each satisfying `policy`.
    Across {
        /// Number of distinct attribute values required.
        count: u32,
        /// Locality attribute to spread across.
        attribute: String,
        /// Policy applied within each attribute value.
        policy: Box<ReplicationPolicy>,
    },
    /// Every listed policy must be satisfied at once.
    And(Vec<ReplicationPolicy>),
}

impl ReplicationPolicy {
    /// Builds an `Across` policy.
    pub fn across(count: u32, attribute: impl Into<String>, policy: ReplicationPolicy) -> Self {
        Self::Across {
            count,
            attribute: attribute.into(),
            policy: Box::new(policy),
        }
    }

    /// `count` distinct zones, one server each. This is the policy assumed
    /// when none has been configured.
    #[must_use]
    pub fn across_zones(count: u32) -> Self {
        Self::across(count, ZONE_ID, Self::One)
    }

    /// Returns the descriptor string, e.g. `dcid^2 x zoneid^2 x 1`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::One => "1".to_string(),
            Self::Across {
                count,
                attribute,
                policy,
            } => format!("{attribute}^{count} x {}", policy.describe()),
            Self::And(policies) => {
                if policies.is_empty() {
                    return String::new();
                }
                let inner = policies
                    .iter()
                    .map(|p| format!("({})", p.describe()))
                    .collect::<Vec<_>>()
                    .join(" & ");
                format!("({inner})")
            }
        }
    }
}

impl fmt::Display for ReplicationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Encode for ReplicationPolicy {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_versioned_bytes(self)
    }
}

impl Decode for ReplicationPolicy {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_versioned_bytes(bytes)
    }
}

impl FromStr for ReplicationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let mut parser = DescriptorParser {
            input: s,
            rest: s.trim(),
            depth: 0,
        };
        let policy = parser.policy()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(policy)
    }
}

/// Deepest policy nesting the descriptor parser accepts.
const MAX_NESTING: usize = 64;

struct DescriptorParser<'a> {
    input: &'a str,
    rest: &'a str,
    depth: usize,
}

impl DescriptorParser<'_> {
    fn error(&self, message: &str) -> CoreError {
        CoreError::invalid_policy(
            self.input,
            format!("{message} at offset {}", self.input.len() - self.rest.len()),
        )
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, token: &str) -> CoreResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn policy(&mut self) -> CoreResult<ReplicationPolicy> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("policy nested too deeply"));
        }
        self.depth += 1;
        let policy = self.nested_policy();
        self.depth -= 1;
        policy
    }

    fn nested_policy(&mut self) -> CoreResult<ReplicationPolicy> {
        self.skip_ws();
        if self.rest.starts_with('(') {
            return self.conjunction();
        }
        let rest = self.rest;
        let word_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let (word, tail) = rest.split_at(word_len);
        if word.is_empty() {
            return Err(self.error("expected a policy"));
        }
        self.rest = tail;
        if word == "1" {
            return Ok(ReplicationPolicy::One);
        }

        self.expect("^")?;
        self.skip_ws();
        let digits = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (count, tail) = self.rest.split_at(digits);
        let count = count
            .parse::<u32>()
            .map_err(|_| self.error("expected a replica count"))?;
        self.rest = tail;
        self.expect("x")?;
        let inner = self.policy()?;
        Ok(ReplicationPolicy::across(count, word, inner))
    }

    fn conjunction(&mut self) -> CoreResult<ReplicationPolicy> {
        self.expect("(")?;
        let mut policies = Vec::new();
        loop {
            self.expect("(")?;
            policies.push(self.policy()?);
            self.expect(")")?;
            if !self.eat("&") {
                break;
            }
        }
        self.expect(")")?;
        Ok(ReplicationPolicy::And(policies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_datacenter() -> ReplicationPolicy {
        ReplicationPolicy::And(vec![
            ReplicationPolicy::across(3, DC_ID, ReplicationPolicy::One),
            ReplicationPolicy::across_zones(3),
        ])
    }

    #[test]
    fn describe_shapes() {
        assert_eq!(ReplicationPolicy::One.describe(), "1");
        assert_eq!(ReplicationPolicy::across_zones(3).describe(), "zoneid^3 x 1");
        assert_eq!(
            ReplicationPolicy::across(2, DC_ID, ReplicationPolicy::across_zones(2)).describe(),
            "dcid^2 x zoneid^2 x 1"
        );
        assert_eq!(
            three_datacenter().describe(),
            "((dcid^3 x 1) & (zoneid^3 x 1))"
        );
        assert_eq!(ReplicationPolicy::And(Vec::new()).describe(), "");
    }

    #[test]
    fn parse_accepts_described_text() {
        for policy in [
            ReplicationPolicy::One,
            ReplicationPolicy::across_zones(2),
            ReplicationPolicy::across(2, DATA_HALL, ReplicationPolicy::across_zones(2)),
            three_datacenter(),
        ] {
            let parsed: ReplicationPolicy = policy.describe().parse().unwrap();
            assert_eq!(parsed, policy);
        }
    }

    #[test]
    fn parse_tolerates_loose_spacing() {
        let parsed: ReplicationPolicy = "  zoneid ^ 3 x 1 ".parse().unwrap();
        assert_eq!(parsed, ReplicationPolicy::across_zones(3));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<ReplicationPolicy>().is_err());
        assert!("zoneid^x 1".parse::<ReplicationPolicy>().is_err());
        assert!("zoneid^3 x 1 extra".parse::<ReplicationPolicy>().is_err());
        assert!("((zoneid^3 x 1)".parse::<ReplicationPolicy>().is_err());
        assert!(matches!(
            "zoneid".parse::<ReplicationPolicy>(),
            Err(CoreError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn blob_decodes_to_same_descriptor() {
        let policy = three_datacenter();
        let blob = policy.encode().unwrap();
        let decoded = ReplicationPolicy::decode(&blob).unwrap();
        assert_eq!(decoded.describe(), policy.describe());
    }

    #[test]
    fn parse_rejects_runaway_nesting() {
        let text = format!("{}1{}", "((".repeat(100_000), "))".repeat(100_000));
        let err = text.parse::<ReplicationPolicy>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidPolicy { .. }));
        assert!(err.to_string().contains("nested too deeply"));

        let chain = format!("{}1", "zoneid^1 x ".repeat(100_000));
        assert!(chain.parse::<ReplicationPolicy>().is_err());
    }

    #[test]
    fn parse_accepts_moderate_nesting() {
        let text = format!("{}zoneid^2 x 1{}", "((".repeat(20), "))".repeat(20));
        let mut policy: ReplicationPolicy = text.parse().unwrap();
        for _ in 0..20 {
            policy = match policy {
                ReplicationPolicy::And(mut inner) => {
                    assert_eq!(inner.len(), 1);
                    inner.remove(0)
                }
                other => panic!("expected a conjunction, got {other:?}"),
            };
        }
        assert_eq!(policy, ReplicationPolicy::across_zones(2));
    }
}
