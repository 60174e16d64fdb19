//! Server exclusions stored under the configuration subspace.
//!
//! Each excluded address is a key `\xff/conf/excluded/<address>` with an
//! empty value, where `<address>` is `ip` (every process on the machine) or
//! `ip:port` (one process).

use crate::error::{CoreError, CoreResult};
use crate::keys::{ConfigKey, EXCLUDED_SERVERS_PREFIX};
use bytes::{BufMut, BytesMut};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// An excluded machine or process.
///
/// A port of zero excludes every process on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressExclusion {
    /// Machine address.
    pub ip: IpAddr,
    /// Process port, or 0 for the whole machine.
    pub port: u16,
}

impl AddressExclusion {
    /// Excludes every process on a machine.
    #[must_use]
    pub const fn machine(ip: IpAddr) -> Self {
        Self { ip, port: 0 }
    }

    /// Excludes a single process.
    #[must_use]
    pub const fn process(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Returns true if this names a whole machine.
    #[must_use]
    pub const fn is_whole_machine(&self) -> bool {
        self.port == 0
    }

    /// An exclusion of the unspecified address with no port matches nothing.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.ip.is_unspecified() || self.port != 0
    }

    /// Returns true if this exclusion covers `addr`.
    #[must_use]
    pub fn excludes(&self, addr: SocketAddr) -> bool {
        self.ip == addr.ip() && (self.is_whole_machine() || self.port == addr.port())
    }

    /// Encodes the exclusion as a configuration key.
    #[must_use]
    pub fn to_key(&self) -> ConfigKey {
        let text = self.to_string();
        let mut key = BytesMut::with_capacity(EXCLUDED_SERVERS_PREFIX.len() + text.len());
        key.put_slice(EXCLUDED_SERVERS_PREFIX);
        key.put_slice(text.as_bytes());
        key.freeze()
    }

    /// Decodes an exclusion from a full configuration key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is outside the exclusion range or the
    /// suffix is not an address.
    pub fn from_key(key: &[u8]) -> CoreResult<Self> {
        let suffix = key
            .strip_prefix(EXCLUDED_SERVERS_PREFIX)
            .ok_or_else(|| CoreError::invalid_exclusion(String::from_utf8_lossy(key)))?;
        let text = std::str::from_utf8(suffix)
            .map_err(|_| CoreError::invalid_exclusion(String::from_utf8_lossy(suffix)))?;
        text.parse()
    }
}

impl fmt::Display for AddressExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole_machine() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{}", SocketAddr::new(self.ip, self.port))
        }
    }
}

impl FromStr for AddressExclusion {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self::process(addr.ip(), addr.port()));
        }
        s.parse::<IpAddr>()
            .map(Self::machine)
            .map_err(|_| CoreError::invalid_exclusion(s))
    }
}

impl From<SocketAddr> for AddressExclusion {
    fn from(addr: SocketAddr) -> Self {
        Self::process(addr.ip(), addr.port())
    }
}
