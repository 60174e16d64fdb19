//! Versioned frame around a CBOR payload.
//!
//! Layout: `magic (2 bytes) | format version (u16 LE) | CBOR payload`.
//! Readers accept any version up to [`FORMAT_VERSION`] so that blobs written
//! by older builds stay loadable.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Magic bytes identifying a configuration blob.
pub const FRAME_MAGIC: [u8; 2] = *b"CC";

/// Current blob format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = 4;

/// Encode a value into a versioned blob.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to CBOR.
pub fn to_versioned_bytes<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 32);
    buf.extend_from_slice(&FRAME_MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buf)
}

/// Decode a value from a versioned blob.
///
/// # Errors
///
/// Returns an error if the header is missing or malformed, the version is
/// newer than [`FORMAT_VERSION`], the payload is not valid CBOR for `T`, or
/// bytes remain after the payload.
pub fn from_versioned_bytes<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    let (version, payload) = split_header(bytes)?;
    if version > FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            version,
            max: FORMAT_VERSION,
        });
    }

    let mut reader = payload;
    let value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: reader.len(),
        });
    }
    Ok(value)
}

/// Returns the format version recorded in a blob header.
///
/// # Errors
///
/// Returns an error if the header is truncated or has the wrong magic.
pub fn peek_version(bytes: &[u8]) -> CodecResult<u16> {
    split_header(bytes).map(|(version, _)| version)
}

fn split_header(bytes: &[u8]) -> CodecResult<(u16, &[u8])> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::UnexpectedEof);
    }
    let magic = [bytes[0], bytes[1]];
    if magic != FRAME_MAGIC {
        return Err(CodecError::BadMagic {
            expected: FRAME_MAGIC,
            actual: magic,
        });
    }
    let version = u16::from_le_bytes([bytes[2], bytes[3]]);
    Ok((version, &bytes[HEADER_LEN..]))
}
