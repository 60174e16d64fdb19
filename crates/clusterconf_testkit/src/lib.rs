//! # ClusterConf Testkit
//!
//! Test utilities for the cluster configuration model.
//!
//! This crate provides:
//! - Fixtures for common cluster layouts built from presets
//! - Property-based test generators using proptest
//! - Canonical summary vectors shared with external tooling
//!
//! ## Usage
//!
//! ```rust
//! use clusterconf_testkit::prelude::*;
//!
//! let config = triple_ssd();
//! assert!(config.is_valid());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
