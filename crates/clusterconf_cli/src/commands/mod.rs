//! CLI command implementations.

pub mod dump;
pub mod exclusions;
pub mod preset;
pub mod show;
pub mod validate;
