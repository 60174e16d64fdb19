//! Core type definitions for the configuration model.

use std::fmt;

/// Sentinel stored in count fields that have not been configured.
pub const UNSET: i32 = -1;

/// Storage engine used by transaction logs or storage servers.
///
/// Engines are persisted as their integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreType {
    /// B-tree on SSD, first on-disk format (code 0).
    SsdBtreeV1,
    /// In-memory engine with disk log (code 1).
    Memory,
    /// B-tree on SSD, second on-disk format (code 2).
    SsdBtreeV2,
    /// Redwood B-tree (code 3).
    SsdRedwoodV1,
    /// No engine configured.
    #[default]
    Unset,
}

impl StoreType {
    /// Converts a persisted code to a store type.
    ///
    /// Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::SsdBtreeV1),
            1 => Some(Self::Memory),
            2 => Some(Self::SsdBtreeV2),
            3 => Some(Self::SsdRedwoodV1),
            _ => None,
        }
    }

    /// Returns the persisted code, or `None` for [`StoreType::Unset`].
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::SsdBtreeV1 => Some(0),
            Self::Memory => Some(1),
            Self::SsdBtreeV2 => Some(2),
            Self::SsdRedwoodV1 => Some(3),
            Self::Unset => None,
        }
    }

    /// Returns true unless this is [`StoreType::Unset`].
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SsdBtreeV1 => "ssd-1",
            Self::Memory => "memory",
            Self::SsdBtreeV2 => "ssd-2",
            Self::SsdRedwoodV1 => "ssd-redwood-1",
            Self::Unset => "unset",
        };
        f.write_str(name)
    }
}
