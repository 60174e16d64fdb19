//! # ClusterConf Codec
//!
//! Versioned binary framing for cluster configuration blobs.
//!
//! Replication policies and configuration snapshots are persisted as opaque
//! byte strings inside the configuration subspace. This crate gives those
//! blobs a small header so readers can reject foreign or future data:
//!
//! - 2 magic bytes (`CC`)
//! - a little-endian `u16` format version
//! - a CBOR payload produced through `serde`
//!
//! ## Usage
//!
//! ```
//! use clusterconf_codec::{from_versioned_bytes, to_versioned_bytes};
//!
//! let bytes = to_versioned_bytes(&("zoneid", 3u32)).unwrap();
//! let decoded: (String, u32) = from_versioned_bytes(&bytes).unwrap();
//! assert_eq!(decoded, ("zoneid".to_string(), 3));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;

pub use error::{CodecError, CodecResult};
pub use frame::{
    from_versioned_bytes, peek_version, to_versioned_bytes, FORMAT_VERSION, FRAME_MAGIC,
    HEADER_LEN,
};

/// Trait for types that can be persisted as a versioned blob.
pub trait Encode {
    /// Encode this value to versioned bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be loaded from a versioned blob.
pub trait Decode: Sized {
    /// Decode this value from versioned bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}
